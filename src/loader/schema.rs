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

//! Parses a schema file: tab-separated `DATABASE`/`TABLE`/`COLUMN`/`INDEX`
//! rows, each attaching to the most recently declared parent. `COLTABLE`
//! tables and non-`HASHINDEX` indexes are rejected per the schema grammar.
//!
//! Unlike the reference loader, a `RowTable` can't grow its column list
//! after construction, so a table's `COLUMN`/`INDEX` rows are buffered in
//! a `PendingTable` and only turned into catalog objects once the next
//! `DATABASE`/`TABLE` row (or end of file) seals it.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::engine::catalog::{Catalog, ObjectId};
use crate::engine::data::ColumnType;
use crate::engine::idx::{HashIndex, DEFAULT_MIN_ARRAY_CAPACITY, DEFAULT_NUM_BUCKETS};
use crate::engine::mem::{Arena, DEFAULT_DIRECTORY_CAPACITY, DEFAULT_PAGE_SIZE};
use crate::engine::row::RowTable;
use crate::util::error::{DbError, DbResult};

struct PendingTable {
    name: String,
    columns: Vec<(String, ColumnType)>,
    indexes: Vec<(String, Vec<String>)>,
}

fn malformed(reason: impl Into<String>) -> DbError {
    DbError::Malformed { reason: reason.into() }
}

fn seal_pending(catalog: &mut Catalog, arena: &Rc<Arena>, db_id: Option<ObjectId>, pending: Option<PendingTable>) -> DbResult<()> {
    let Some(pt) = pending else { return Ok(()) };
    let db_id = db_id.ok_or(DbError::MissingDatabase)?;
    let row_table = Rc::new(RowTable::new(
        Rc::clone(arena),
        pt.columns.iter().map(|(_, ty)| *ty).collect(),
        DEFAULT_PAGE_SIZE,
        DEFAULT_DIRECTORY_CAPACITY,
    ));
    let table_id = catalog.create_table(db_id, &pt.name, row_table)?;
    for (name, ty) in &pt.columns {
        catalog.add_column(table_id, name, *ty)?;
    }
    log::info!("table `{}` created with {} column(s)", pt.name, pt.columns.len());
    for (index_name, key_names) in &pt.indexes {
        let key_columns: Vec<ObjectId> = key_names.iter().map(|n| catalog.column_id(table_id, n)).collect::<DbResult<_>>()?;
        let key_positions: Vec<usize> = key_columns.iter().map(|&c| catalog.column(c).index_in_row).collect();
        let hash_index = Rc::new(HashIndex::new(
            Rc::clone(arena),
            Rc::clone(&catalog.table(table_id).row_table),
            key_positions,
            DEFAULT_NUM_BUCKETS,
            DEFAULT_MIN_ARRAY_CAPACITY,
        ));
        catalog.create_index(table_id, index_name, hash_index, key_columns)?;
        log::info!("index `{}` built on table `{}`", index_name, pt.name);
    }
    Ok(())
}

/// Loads `path`, returning the id of the last `DATABASE` declared (the
/// database `loader::data::load_data_dir` should populate next).
pub fn load_schema_file(path: &Path, catalog: &mut Catalog, arena: &Rc<Arena>) -> DbResult<ObjectId> {
    let text = fs::read_to_string(path).map_err(|e| malformed(format!("cannot read schema file `{}`: {e}", path.display())))?;

    let mut current_db: Option<ObjectId> = None;
    let mut pending: Option<PendingTable> = None;

    for (lineno, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "DATABASE" => {
                seal_pending(catalog, arena, current_db, pending.take())?;
                let name = fields.get(1).ok_or_else(|| malformed(format!("line {}: DATABASE row missing a name", lineno + 1)))?;
                let id = catalog.create_database(name)?;
                log::info!("database `{name}` opened");
                current_db = Some(id);
            }
            "TABLE" => {
                seal_pending(catalog, arena, current_db, pending.take())?;
                let name = fields.get(1).ok_or_else(|| malformed(format!("line {}: TABLE row missing a name", lineno + 1)))?;
                let kind = fields.get(2).ok_or_else(|| malformed(format!("line {}: TABLE row missing a type", lineno + 1)))?;
                if *kind != "ROWTABLE" {
                    log::warn!("table `{name}` declares unsupported type `{kind}`, rejecting");
                    return Err(DbError::UnsupportedTableType);
                }
                pending = Some(PendingTable {
                    name: name.to_string(),
                    columns: Vec::new(),
                    indexes: Vec::new(),
                });
            }
            "COLUMN" => {
                let pt = pending.as_mut().ok_or_else(|| malformed(format!("line {}: COLUMN row with no open TABLE", lineno + 1)))?;
                let name = fields.get(1).ok_or_else(|| malformed(format!("line {}: COLUMN row missing a name", lineno + 1)))?;
                let type_name = fields.get(2).ok_or_else(|| malformed(format!("line {}: COLUMN row missing a type", lineno + 1)))?;
                let size = fields
                    .get(3)
                    .map(|s| s.parse::<usize>().map_err(|_| malformed(format!("line {}: CHARN size must be numeric", lineno + 1))))
                    .transpose()?;
                let ty = ColumnType::parse_name(type_name, size)?;
                pt.columns.push((name.to_string(), ty));
            }
            "INDEX" => {
                let pt = pending.as_mut().ok_or_else(|| malformed(format!("line {}: INDEX row with no open TABLE", lineno + 1)))?;
                let name = fields.get(1).ok_or_else(|| malformed(format!("line {}: INDEX row missing a name", lineno + 1)))?;
                let kind = fields.get(2).ok_or_else(|| malformed(format!("line {}: INDEX row missing a type", lineno + 1)))?;
                if *kind != "HASHINDEX" {
                    log::warn!("index `{name}` declares unsupported type `{kind}`, rejecting");
                    return Err(DbError::UnsupportedIndexType);
                }
                let key_names: Vec<String> = fields[3..].iter().map(|s| s.to_string()).collect();
                if key_names.is_empty() {
                    return Err(malformed(format!("line {}: INDEX row names no key columns", lineno + 1)));
                }
                pt.indexes.push((name.to_string(), key_names));
            }
            other => return Err(malformed(format!("line {}: unknown schema directive `{other}`", lineno + 1))),
        }
    }

    seal_pending(catalog, arena, current_db, pending.take())?;
    current_db.ok_or_else(|| malformed("schema file declares no DATABASE"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_one_table_with_columns_and_index() {
        let mut catalog = Catalog::new();
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.txt");
        fs::write(
            &schema_path,
            "DATABASE\ttpch\n\
             TABLE\tsupplier\tROWTABLE\n\
             COLUMN\ts_suppkey\tINT32\n\
             COLUMN\ts_name\tCHARN\t25\n\
             COLUMN\ts_nationkey\tINT32\n\
             INDEX\ts_pk\tHASHINDEX\ts_suppkey\n",
        )
        .unwrap();

        let db_id = load_schema_file(&schema_path, &mut catalog, &arena).unwrap();
        assert_eq!(catalog.database(db_id).name, "tpch");
        let table_id = catalog.table_id(db_id, "supplier").unwrap();
        assert_eq!(catalog.table(table_id).columns.len(), 3);
        assert_eq!(catalog.table(table_id).indexes.len(), 1);
        assert_eq!(catalog.column(catalog.column_id(table_id, "s_name").unwrap()).ty, ColumnType::CharN(25));
    }

    #[test]
    fn rejects_coltable() {
        let mut catalog = Catalog::new();
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.txt");
        fs::write(&schema_path, "DATABASE\ttpch\nTABLE\tfoo\tCOLTABLE\n").unwrap();
        assert_eq!(load_schema_file(&schema_path, &mut catalog, &arena), Err(DbError::UnsupportedTableType));
    }

    #[test]
    fn rejects_non_hash_index() {
        let mut catalog = Catalog::new();
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.txt");
        fs::write(
            &schema_path,
            "DATABASE\ttpch\nTABLE\tfoo\tROWTABLE\nCOLUMN\tfoo_key\tINT32\nINDEX\tfoo_ix\tBPTREEINDEX\tfoo_key\n",
        )
        .unwrap();
        assert_eq!(load_schema_file(&schema_path, &mut catalog, &arena), Err(DbError::UnsupportedIndexType));
    }
}
