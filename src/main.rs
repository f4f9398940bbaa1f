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

//! `runaimdb`'s process entry point: parse arguments, load the schema
//! and data files into one process-wide arena and catalog, and hand
//! both to whatever drives queries against them. There is no REPL and
//! no network listener here — query plans are structured descriptors
//! built by an embedding caller, not parsed from stdin.

use std::process::ExitCode;
use std::rc::Rc;

use aimdb::config::Args;
use aimdb::engine::mem::Arena;
use aimdb::engine::Catalog;
use aimdb::loader;
use aimdb::util::error::DbError;

/// Total bytes reserved for the process-wide arena and its allocation
/// quantum. TPC-H-lite fixtures comfortably fit; a real deployment
/// would size this from the schema/data footprint instead.
const ARENA_BYTES: usize = 1 << 26;
const ARENA_MIN_SIZE: usize = 8;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("AIMDB_LOG", default_level)).init();
}

fn run() -> Result<(), DbError> {
    let args = Args::parse()?;
    init_logging(args.verbose);

    let arena = Rc::new(Arena::new(ARENA_BYTES, ARENA_MIN_SIZE));
    let mut catalog = Catalog::new();

    let db_id = loader::schema::load_schema_file(&args.schema_file, &mut catalog, &arena)?;
    loader::data::load_data_dir(&catalog, db_id, &args.data_dir)?;

    log::info!("database `{}` loaded and ready", catalog.database(db_id).name);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("runaimdb: {e}");
            ExitCode::FAILURE
        }
    }
}
