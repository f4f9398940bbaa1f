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

//! Reads one `<table_name>.tab` file per table declared in `db_id`,
//! parses each value through its column's text-to-binary converter, and
//! inserts the row into the table's `RowTable` and every index declared
//! on it.

use std::fs;
use std::path::Path;

use crate::engine::catalog::{Catalog, ObjectId};
use crate::util::error::{DbError, DbResult};

fn malformed(reason: impl Into<String>) -> DbError {
    DbError::Malformed { reason: reason.into() }
}

pub fn load_data_dir(catalog: &Catalog, db_id: ObjectId, data_dir: &Path) -> DbResult<()> {
    for &table_id in &catalog.database(db_id).tables {
        let table = catalog.table(table_id);
        let path = data_dir.join(format!("{}.tab", table.name));
        let text = fs::read_to_string(&path).map_err(|e| malformed(format!("cannot read data file `{}`: {e}", path.display())))?;

        let mut loaded = 0usize;
        for (lineno, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != table.columns.len() {
                return Err(malformed(format!(
                    "{}:{}: expected {} column(s), found {}",
                    path.display(),
                    lineno + 1,
                    table.columns.len(),
                    fields.len()
                )));
            }

            let mut encoded: Vec<Vec<u8>> = Vec::with_capacity(fields.len());
            for (field, &col_id) in fields.iter().zip(&table.columns) {
                let ty = catalog.column(col_id).ty;
                let mut buf = vec![0u8; ty.byte_width()];
                ty.format_binary(field, &mut buf)?;
                encoded.push(buf);
            }
            let refs: Vec<&[u8]> = encoded.iter().map(|b| b.as_slice()).collect();
            let ordinal = table.row_table.insert_columns(&refs)?;
            let ptr = table.row_table.record_ptr(ordinal)?;

            for &index_id in &table.indexes {
                let index = catalog.index(index_id);
                let mut key = Vec::with_capacity(index.hash_index.key_width());
                for &col_id in &index.key_columns {
                    let pos = catalog.column(col_id).index_in_row;
                    key.extend_from_slice(&encoded[pos]);
                }
                index.hash_index.insert(&key, ptr)?;
            }
            loaded += 1;
        }
        log::info!("loaded {} row(s) into table `{}`", loaded, table.name);
    }
    Ok(())
}
