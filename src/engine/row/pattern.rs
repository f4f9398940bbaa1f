/*
 * Created on Tue Feb 10 2026
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

//! Derives a fixed per-row byte layout from an ordered list of column
//! types: a byte offset for each column and a total row size. Every
//! pattern built through `RPattern::new` appends one more column
//! itself: a `CHARN(1)` validity byte that the caller's column list
//! never sees.

use crate::engine::data::ColumnType;

#[derive(Debug, Clone)]
pub struct RPattern {
    columns: Vec<ColumnType>,
    offsets: Vec<usize>,
    row_size: usize,
    data_columns: usize,
}

impl RPattern {
    pub fn new(data_columns: Vec<ColumnType>) -> Self {
        let data_count = data_columns.len();
        let mut columns = data_columns;
        columns.push(ColumnType::CharN(1));
        let mut offsets = Vec::with_capacity(columns.len());
        let mut offset = 0usize;
        for c in &columns {
            offsets.push(offset);
            offset += c.byte_width();
        }
        debug_assert_eq!(
            offset,
            columns.iter().map(ColumnType::byte_width).sum::<usize>(),
            "row size must equal the sum of column widths including the validity byte"
        );
        RPattern {
            columns,
            offsets,
            row_size: offset,
            data_columns: data_count,
        }
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn data_column_count(&self) -> usize {
        self.data_columns
    }

    pub fn column_type(&self, idx: usize) -> ColumnType {
        self.columns[idx]
    }

    pub fn data_columns(&self) -> &[ColumnType] {
        &self.columns[..self.data_columns]
    }

    pub fn offset(&self, idx: usize) -> usize {
        self.offsets[idx]
    }

    pub fn validity_offset(&self) -> usize {
        self.offsets[self.data_columns]
    }
}
