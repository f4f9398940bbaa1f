/*
 * Created on Thu Feb 12 2026
 *
 * This file is a part of AIMDB
 * AIMDB is an in-memory analytical database engine that loads a
 * star-schema dataset from tab-separated files and executes
 * precompiled query plans against a single-threaded storage and
 * execution core.
 *
 * Copyright (c) 2026, AIMDB Contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! `runaimdb <schema_file> <data_dir> [-v]`. Validated once, up front,
//! so nothing downstream has to re-check argument shape.

use std::path::PathBuf;

use crate::util::error::{DbError, DbResult};

pub const USAGE: &str = "usage: runaimdb <schema_file> <data_dir> [-v]";

pub struct Args {
    pub schema_file: PathBuf,
    pub data_dir: PathBuf,
    pub verbose: bool,
}

impl Args {
    pub fn parse() -> DbResult<Self> {
        Self::from_args(std::env::args().skip(1))
    }

    pub fn from_args(args: impl Iterator<Item = String>) -> DbResult<Self> {
        let args: Vec<String> = args.collect();
        if args.len() < 2 || args.len() > 3 {
            return Err(DbError::Malformed { reason: USAGE.to_string() });
        }
        let verbose = match args.get(2) {
            None => false,
            Some(flag) if flag == "-v" => true,
            Some(other) => {
                return Err(DbError::Malformed {
                    reason: format!("unrecognized option `{other}`\n{USAGE}"),
                })
            }
        };

        let schema_file = PathBuf::from(&args[0]);
        let data_dir = PathBuf::from(&args[1]);
        if !schema_file.is_file() {
            return Err(DbError::Malformed {
                reason: format!("schema file `{}` does not exist", schema_file.display()),
            });
        }
        if !data_dir.is_dir() {
            return Err(DbError::Malformed {
                reason: format!("data directory `{}` does not exist", data_dir.display()),
            });
        }
        Ok(Args { schema_file, data_dir, verbose })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_argument_count() {
        let err = Args::from_args(vec!["only_one".to_string()].into_iter()).unwrap_err();
        assert!(matches!(err, DbError::Malformed { .. }));
    }

    #[test]
    fn rejects_unknown_flag() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.txt");
        std::fs::write(&schema, "").unwrap();
        let args = vec![schema.display().to_string(), dir.path().display().to_string(), "-x".to_string()];
        assert!(Args::from_args(args.into_iter()).is_err());
    }

    #[test]
    fn accepts_verbose_flag_with_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.txt");
        std::fs::write(&schema, "").unwrap();
        let args = vec![schema.display().to_string(), dir.path().display().to_string(), "-v".to_string()];
        let parsed = Args::from_args(args.into_iter()).unwrap();
        assert!(parsed.verbose);
    }

    #[test]
    fn rejects_missing_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = vec![dir.path().join("nope.txt").display().to_string(), dir.path().display().to_string()];
        assert!(Args::from_args(args.into_iter()).is_err());
    }
}
