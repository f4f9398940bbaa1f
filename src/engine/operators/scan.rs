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

//! Leaf of every operator tree: reads one row table sequentially,
//! lowest ordinal first, skipping tombstones.

use std::rc::Rc;

use crate::engine::data::ColumnType;
use crate::engine::result::ResultTable;
use crate::engine::row::RowTable;
use crate::util::error::DbResult;

use super::Operator;

pub struct Scan {
    table: Rc<RowTable>,
    columns: Vec<usize>,
    schema: Vec<ColumnType>,
    cursor: usize,
    ended: bool,
}

impl Scan {
    pub fn new(table: Rc<RowTable>) -> Self {
        let n = table.pattern().data_column_count();
        Self::with_columns(table, (0..n).collect())
    }

    /// Scans a subset of the table's columns, in the given order.
    pub fn with_columns(table: Rc<RowTable>, columns: Vec<usize>) -> Self {
        let schema = columns.iter().map(|&c| table.pattern().column_type(c)).collect();
        Scan {
            table,
            columns,
            schema,
            cursor: 0,
            ended: false,
        }
    }
}

impl Operator for Scan {
    fn init(&mut self) -> DbResult<()> {
        self.cursor = 0;
        self.ended = false;
        Ok(())
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        loop {
            if self.cursor >= self.table.record_count() {
                self.ended = true;
                return Ok(false);
            }
            let ordinal = self.cursor;
            self.cursor += 1;
            if !self.table.is_visible(ordinal)? {
                continue;
            }
            out.reset();
            out.push_row();
            for (i, &col) in self.columns.iter().enumerate() {
                let w = self.schema[i].byte_width();
                let mut buf = vec![0u8; w];
                self.table.select_col(ordinal, col, &mut buf)?;
                out.set(0, i, &buf);
            }
            return Ok(true);
        }
    }

    fn is_end(&self) -> bool {
        self.ended
    }

    fn close(&mut self) -> DbResult<()> {
        Ok(())
    }

    fn schema(&self) -> &[ColumnType] {
        &self.schema
    }

    fn size_hint(&self) -> usize {
        self.table.record_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mem::Arena;

    fn table_with(values: &[i32]) -> Rc<RowTable> {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = Rc::new(RowTable::new(arena, vec![ColumnType::Int32], 4096, 4));
        for &v in values {
            t.insert(&v.to_le_bytes()).unwrap();
        }
        t
    }

    #[test]
    fn scan_yields_rows_in_ordinal_order() {
        let t = table_with(&[10, 20, 30]);
        let mut scan = Scan::new(t);
        scan.init().unwrap();
        let mut out = ResultTable::one_row(scan.schema().to_vec());
        let mut seen = Vec::new();
        while scan.next(&mut out).unwrap() {
            seen.push(i32::from_le_bytes(out.get(0, 0).try_into().unwrap()));
        }
        assert_eq!(seen, vec![10, 20, 30]);
        assert!(scan.is_end());
    }

    #[test]
    fn scan_skips_tombstoned_rows() {
        let t = table_with(&[1, 2, 3]);
        t.delete(1).unwrap();
        let mut scan = Scan::new(t);
        scan.init().unwrap();
        let mut out = ResultTable::one_row(scan.schema().to_vec());
        let mut seen = Vec::new();
        while scan.next(&mut out).unwrap() {
            seen.push(i32::from_le_bytes(out.get(0, 0).try_into().unwrap()));
        }
        assert_eq!(seen, vec![1, 3]);
    }
}
