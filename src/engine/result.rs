/*
 * Created on Wed Feb 11 2026
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

//! Fixed-width row buffer used for per-operator materialization: every
//! `Operator::next` writes into a one-row `ResultTable`, and the
//! executor drains a whole tree into a page-sized one. Unlike tables
//! and indexes, result buffers are short-lived (they live between
//! `init` and the operator's `close`), so they own a plain heap buffer
//! rather than arena-carved memory.

use std::io;

use crate::engine::data::ColumnType;

#[derive(Clone)]
pub struct ResultTable {
    types: Vec<ColumnType>,
    offsets: Vec<usize>,
    row_length: usize,
    capacity: usize,
    row_count: usize,
    buffer: Vec<u8>,
}

impl ResultTable {
    pub fn new(types: Vec<ColumnType>, capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(types.len());
        let mut off = 0usize;
        for t in &types {
            offsets.push(off);
            off += t.byte_width();
        }
        let row_length = off.max(1);
        ResultTable {
            buffer: vec![0u8; row_length * capacity],
            types,
            offsets,
            row_length,
            capacity,
            row_count: 0,
        }
    }

    /// A single-row buffer, the shape every `Operator::next` writes
    /// into.
    pub fn one_row(types: Vec<ColumnType>) -> Self {
        Self::new(types, 1)
    }

    /// A page-sized buffer per the executor's pagination rule: as many
    /// rows as fit in 1024 bytes, at least one.
    pub fn paged(types: Vec<ColumnType>) -> Self {
        let row_length: usize = types.iter().map(ColumnType::byte_width).sum::<usize>().max(1);
        let capacity = (1024 / row_length).max(1);
        Self::new(types, capacity)
    }

    /// An initially-empty buffer that grows on demand, used by
    /// operators (`HashJoin`'s build side, `OrderBy`, `GroupBy`) that
    /// must materialize an entire child stream before they know its
    /// row count.
    pub fn growable(types: Vec<ColumnType>) -> Self {
        Self::new(types, 0)
    }

    /// Reserves the next row slot, doubling the backing buffer first if
    /// it's full, and returns the new row's index.
    pub fn push_row_grow(&mut self) -> usize {
        if self.row_count >= self.capacity {
            let new_capacity = (self.capacity * 2).max(16);
            self.buffer.resize(new_capacity * self.row_length, 0);
            self.capacity = new_capacity;
        }
        let idx = self.row_count;
        self.row_count += 1;
        idx
    }

    pub fn column_count(&self) -> usize {
        self.types.len()
    }

    pub fn column_type(&self, col: usize) -> ColumnType {
        self.types[col]
    }

    pub fn types(&self) -> &[ColumnType] {
        &self.types
    }

    pub fn row_length(&self) -> usize {
        self.row_length
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.row_count >= self.capacity
    }

    pub fn reset(&mut self) {
        self.row_count = 0;
    }

    pub fn set(&mut self, row: usize, col: usize, value: &[u8]) {
        let w = self.types[col].byte_width();
        let off = row * self.row_length + self.offsets[col];
        self.buffer[off..off + w].copy_from_slice(&value[..w]);
    }

    pub fn get(&self, row: usize, col: usize) -> &[u8] {
        let w = self.types[col].byte_width();
        let off = row * self.row_length + self.offsets[col];
        &self.buffer[off..off + w]
    }

    /// Reserves the next row slot; returns `false` (without advancing)
    /// if the buffer is already at capacity.
    pub fn push_row(&mut self) -> bool {
        if self.row_count >= self.capacity {
            return false;
        }
        self.row_count += 1;
        true
    }

    /// Copies one full row from `src` (another `ResultTable` of the
    /// same schema) at `src_row` into `row` of `self`.
    pub fn copy_row_from(&mut self, row: usize, src: &ResultTable, src_row: usize) {
        for col in 0..self.types.len() {
            let bytes = src.get(src_row, col).to_vec();
            self.set(row, col, &bytes);
        }
    }

    pub fn dump<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        for r in 0..self.row_count {
            for c in 0..self.types.len() {
                if c > 0 {
                    write!(w, "\t")?;
                }
                write!(w, "{}", self.types[c].format_text(self.get(r, c)))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    pub fn print(&self) -> io::Result<()> {
        self.dump(&mut io::stdout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut rt = ResultTable::new(vec![ColumnType::Int32, ColumnType::CharN(4)], 2);
        rt.push_row();
        rt.set(0, 0, &7i32.to_le_bytes());
        rt.set(0, 1, b"abcd");
        assert_eq!(rt.get(0, 0), &7i32.to_le_bytes());
        assert_eq!(rt.get(0, 1), b"abcd");
    }

    #[test]
    fn paged_capacity_matches_1024_byte_budget() {
        let rt = ResultTable::paged(vec![ColumnType::Int64, ColumnType::Int64]);
        assert_eq!(rt.row_length(), 16);
        assert_eq!(rt.capacity(), 64);
    }

    #[test]
    fn push_row_stops_at_capacity() {
        let mut rt = ResultTable::new(vec![ColumnType::Int8], 2);
        assert!(rt.push_row());
        assert!(rt.push_row());
        assert!(!rt.push_row());
    }
}
