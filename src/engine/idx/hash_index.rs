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

//! Packs one or more key columns into a single 64-bit fingerprint and
//! uses it as the key of a `HashTable`. The fingerprint is a possibly
//! lossy filter: every candidate it yields is re-checked column by
//! column against the indexed row before being handed to the caller.

use std::rc::Rc;

use crate::engine::data::ColumnType;
use crate::engine::row::RowTable;
use crate::util::error::DbResult;

use super::hash_table::HashTable;

/// Total bits available in a fingerprint.
const CELL_CAP_BITS: u32 = 64;

pub struct HashIndex {
    inner: HashTable,
    row_table: Rc<RowTable>,
    key_columns: Vec<usize>,
    key_types: Vec<ColumnType>,
    bit_alloc: Vec<u32>,
}

impl HashIndex {
    pub fn new(
        arena: Rc<crate::engine::mem::Arena>,
        row_table: Rc<RowTable>,
        key_columns: Vec<usize>,
        num_buckets: usize,
        min_array_capacity: usize,
    ) -> Self {
        let key_types: Vec<ColumnType> = key_columns.iter().map(|&c| row_table.pattern().column_type(c)).collect();
        let n = key_types.len() as u32;
        let base_alloc = (CELL_CAP_BITS / n.max(1)).saturating_sub(1);
        let mut remaining = CELL_CAP_BITS;
        let mut bit_alloc = Vec::with_capacity(key_types.len());
        for ty in &key_types {
            let bits = ty.index_bits().min(base_alloc).min(remaining);
            bit_alloc.push(bits);
            remaining -= bits;
        }
        HashIndex {
            inner: HashTable::new(arena, num_buckets, min_array_capacity),
            row_table,
            key_columns,
            key_types,
            bit_alloc,
        }
    }

    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    pub fn key_width(&self) -> usize {
        self.key_types.iter().map(ColumnType::byte_width).sum()
    }

    fn fingerprint(&self, key: &[u8]) -> u64 {
        let mut fp = 0u64;
        let mut shift = 0u32;
        let mut off = 0usize;
        for (i, ty) in self.key_types.iter().enumerate() {
            let w = ty.byte_width();
            let bits = self.bit_alloc[i];
            if bits > 0 {
                let raw = ty.fingerprint_bits(&key[off..off + w]);
                let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
                fp |= (raw & mask) << shift;
                shift += bits;
            }
            off += w;
        }
        fp
    }

    /// `key` is the concatenation of every key column's bytes, in
    /// declared order, `key_width()` bytes long.
    pub fn insert(&self, key: &[u8], row_ptr: usize) -> DbResult<()> {
        self.inner.add(self.fingerprint(key), row_ptr)
    }

    pub fn delete(&self, key: &[u8], row_ptr: usize) -> bool {
        self.inner.del(self.fingerprint(key), row_ptr)
    }

    pub fn lookup<'a>(&'a self, key: &[u8]) -> IndexLookup<'a> {
        IndexLookup {
            index: self,
            info: HashInfo::new(&self.inner, self.fingerprint(key)),
            key: key.to_vec(),
        }
    }
}

/// A streaming lookup iterator: holds up to 8 candidate pointers at a
/// time and refills from the bucket via `probe_contd` on exhaustion,
/// so a caller can walk arbitrarily many duplicate fingerprints
/// through one fixed-size buffer.
struct HashInfo<'a> {
    table: &'a HashTable,
    fingerprint: u64,
    buf: [usize; 8],
    filled: usize,
    idx: usize,
    more: bool,
    resume_at: usize,
    started: bool,
}

impl<'a> HashInfo<'a> {
    fn new(table: &'a HashTable, fingerprint: u64) -> Self {
        HashInfo {
            table,
            fingerprint,
            buf: [0; 8],
            filled: 0,
            idx: 0,
            more: false,
            resume_at: 0,
            started: false,
        }
    }

    fn refill(&mut self) {
        let n = if !self.started {
            self.started = true;
            self.table.probe(self.fingerprint, &mut self.buf)
        } else {
            self.table.probe_contd(self.fingerprint, self.resume_at, &mut self.buf)
        };
        if n >= 0 {
            self.filled = n as usize;
            self.more = false;
        } else {
            self.filled = self.buf.len();
            self.resume_at = (-n) as usize;
            self.more = true;
        }
        self.idx = 0;
    }

    fn next(&mut self) -> Option<usize> {
        if !self.started {
            self.refill();
        }
        if self.idx >= self.filled {
            if !self.more {
                return None;
            }
            self.refill();
            if self.filled == 0 {
                return None;
            }
        }
        let v = self.buf[self.idx];
        self.idx += 1;
        Some(v)
    }
}

pub struct IndexLookup<'a> {
    index: &'a HashIndex,
    info: HashInfo<'a>,
    key: Vec<u8>,
}

impl<'a> Iterator for IndexLookup<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let candidate = self.info.next()?;
            let row = self.index.row_table.row_bytes_at(candidate);
            let mut off = 0;
            let mut all_match = true;
            for (i, &col) in self.index.key_columns.iter().enumerate() {
                let ty = self.index.key_types[i];
                let w = ty.byte_width();
                let col_off = self.index.row_table.pattern().offset(col);
                if !ty.equal(&row[col_off..col_off + w], &self.key[off..off + w]) {
                    all_match = false;
                    break;
                }
                off += w;
            }
            if all_match {
                return Some(candidate);
            }
        }
    }
}
