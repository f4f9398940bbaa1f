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

//! Combines a pattern and storage into typed record operations:
//! insert/select/update/delete with validity tracking. Ordinals are
//! never reused; deletion only flips the trailing validity byte.

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::mem::Arena;
use crate::util::error::{DbError, DbResult};

use super::pattern::RPattern;
use super::storage::MStorage;

pub struct RowTable {
    pattern: RPattern,
    storage: MStorage,
    record_count: Cell<usize>,
}

impl RowTable {
    pub fn new(arena: Rc<Arena>, columns: Vec<crate::engine::data::ColumnType>, page_size: usize, initial_directory_capacity: usize) -> Self {
        let pattern = RPattern::new(columns);
        let storage = MStorage::new(arena, pattern.row_size(), page_size, initial_directory_capacity);
        RowTable {
            pattern,
            storage,
            record_count: Cell::new(0),
        }
    }

    pub fn pattern(&self) -> &RPattern {
        &self.pattern
    }

    pub fn record_count(&self) -> usize {
        self.record_count.get()
    }

    pub fn arena(&self) -> &Rc<Arena> {
        self.storage.arena()
    }

    /// Appends one fully-encoded data row (validity byte excluded; it
    /// is set to `'Y'` here). Returns the new row's ordinal.
    pub fn insert(&self, row: &[u8]) -> DbResult<usize> {
        let ordinal = self.record_count.get();
        let ptr = self.storage.row_ptr(ordinal)?;
        let row_size = self.pattern.row_size();
        let buf = self.storage.arena().slice_mut(ptr, row_size);
        let data_len = row_size - 1;
        buf[..data_len].copy_from_slice(&row[..data_len]);
        buf[self.pattern.validity_offset()] = b'Y';
        self.record_count.set(ordinal + 1);
        Ok(ordinal)
    }

    /// Appends a row built by copying each column's bytes from
    /// `columns[i]` into its offset, in column declaration order.
    pub fn insert_columns(&self, columns: &[&[u8]]) -> DbResult<usize> {
        let ordinal = self.record_count.get();
        let ptr = self.storage.row_ptr(ordinal)?;
        let row_size = self.pattern.row_size();
        {
            let buf = self.storage.arena().slice_mut(ptr, row_size);
            for (i, col_bytes) in columns.iter().enumerate() {
                let ty = self.pattern.column_type(i);
                let off = self.pattern.offset(i);
                let w = ty.byte_width();
                buf[off..off + w].copy_from_slice(&col_bytes[..w]);
            }
            buf[self.pattern.validity_offset()] = b'Y';
        }
        self.record_count.set(ordinal + 1);
        Ok(ordinal)
    }

    fn checked_ptr(&self, ordinal: usize) -> DbResult<usize> {
        if ordinal >= self.record_count.get() {
            return Err(DbError::InvalidOrdinal {
                ordinal: ordinal as u64,
                record_count: self.record_count.get() as u64,
            });
        }
        self.storage.row_ptr(ordinal)
    }

    pub fn is_visible(&self, ordinal: usize) -> DbResult<bool> {
        let ptr = self.checked_ptr(ordinal)?;
        Ok(self.is_visible_at(ptr))
    }

    pub fn is_visible_at(&self, ptr: usize) -> bool {
        self.storage.arena().slice(ptr, self.pattern.row_size())[self.pattern.validity_offset()] == b'Y'
    }

    pub fn record_ptr(&self, ordinal: usize) -> DbResult<usize> {
        self.checked_ptr(ordinal)
    }

    pub fn row_bytes_at(&self, ptr: usize) -> &[u8] {
        self.storage.arena().slice(ptr, self.pattern.row_size())
    }

    pub fn select(&self, ordinal: usize, dest: &mut [u8]) -> DbResult<()> {
        let ptr = self.checked_ptr(ordinal)?;
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ordinal as u64 });
        }
        dest.copy_from_slice(self.row_bytes_at(ptr));
        Ok(())
    }

    /// Same as `select`, keyed by an already-resolved row pointer (e.g.
    /// from `record_ptr` or a `HashIndex` lookup), skipping the ordinal
    /// bounds check.
    pub fn select_at(&self, ptr: usize, dest: &mut [u8]) -> DbResult<()> {
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ptr as u64 });
        }
        dest.copy_from_slice(self.row_bytes_at(ptr));
        Ok(())
    }

    pub fn select_col(&self, ordinal: usize, col: usize, dest: &mut [u8]) -> DbResult<()> {
        let ptr = self.checked_ptr(ordinal)?;
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ordinal as u64 });
        }
        let ty = self.pattern.column_type(col);
        let off = self.pattern.offset(col);
        let w = ty.byte_width();
        let row = self.row_bytes_at(ptr);
        dest[..w].copy_from_slice(&row[off..off + w]);
        Ok(())
    }

    /// Same as `select_col`, keyed by an already-resolved row pointer,
    /// skipping the ordinal bounds check.
    pub fn select_col_at(&self, ptr: usize, col: usize, dest: &mut [u8]) -> DbResult<()> {
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ptr as u64 });
        }
        let ty = self.pattern.column_type(col);
        let off = self.pattern.offset(col);
        let w = ty.byte_width();
        let row = self.row_bytes_at(ptr);
        dest[..w].copy_from_slice(&row[off..off + w]);
        Ok(())
    }

    pub fn select_cols(&self, ordinal: usize, cols: &[usize], dest: &mut [u8]) -> DbResult<()> {
        let ptr = self.checked_ptr(ordinal)?;
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ordinal as u64 });
        }
        let row = self.row_bytes_at(ptr);
        let mut out_off = 0;
        for &col in cols {
            let ty = self.pattern.column_type(col);
            let off = self.pattern.offset(col);
            let w = ty.byte_width();
            dest[out_off..out_off + w].copy_from_slice(&row[off..off + w]);
            out_off += w;
        }
        Ok(())
    }

    /// Same as `select_cols`, keyed by an already-resolved row pointer,
    /// skipping the ordinal bounds check.
    pub fn select_cols_at(&self, ptr: usize, cols: &[usize], dest: &mut [u8]) -> DbResult<()> {
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ptr as u64 });
        }
        let row = self.row_bytes_at(ptr);
        let mut out_off = 0;
        for &col in cols {
            let ty = self.pattern.column_type(col);
            let off = self.pattern.offset(col);
            let w = ty.byte_width();
            dest[out_off..out_off + w].copy_from_slice(&row[off..off + w]);
            out_off += w;
        }
        Ok(())
    }

    pub fn update_col(&self, ordinal: usize, col: usize, value: &[u8]) -> DbResult<()> {
        let ptr = self.checked_ptr(ordinal)?;
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ordinal as u64 });
        }
        let ty = self.pattern.column_type(col);
        let off = self.pattern.offset(col);
        let w = ty.byte_width();
        let row_size = self.pattern.row_size();
        self.storage.arena().slice_mut(ptr, row_size)[off..off + w].copy_from_slice(&value[..w]);
        Ok(())
    }

    /// Same as `update_col`, keyed by an already-resolved row pointer,
    /// skipping the ordinal bounds check.
    pub fn update_col_at(&self, ptr: usize, col: usize, value: &[u8]) -> DbResult<()> {
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ptr as u64 });
        }
        let ty = self.pattern.column_type(col);
        let off = self.pattern.offset(col);
        let w = ty.byte_width();
        let row_size = self.pattern.row_size();
        self.storage.arena().slice_mut(ptr, row_size)[off..off + w].copy_from_slice(&value[..w]);
        Ok(())
    }

    pub fn update_cols(&self, ordinal: usize, cols: &[usize], values: &[&[u8]]) -> DbResult<()> {
        for (&col, value) in cols.iter().zip(values.iter()) {
            self.update_col(ordinal, col, value)?;
        }
        Ok(())
    }

    /// Same as `update_cols`, keyed by an already-resolved row pointer,
    /// skipping the ordinal bounds check.
    pub fn update_cols_at(&self, ptr: usize, cols: &[usize], values: &[&[u8]]) -> DbResult<()> {
        for (&col, value) in cols.iter().zip(values.iter()) {
            self.update_col_at(ptr, col, value)?;
        }
        Ok(())
    }

    pub fn delete(&self, ordinal: usize) -> DbResult<()> {
        let ptr = self.checked_ptr(ordinal)?;
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ordinal as u64 });
        }
        self.mark_deleted(ptr);
        Ok(())
    }

    /// Same as `delete`, keyed by an already-resolved row pointer,
    /// skipping the ordinal bounds check.
    pub fn delete_at(&self, ptr: usize) -> DbResult<()> {
        if !self.is_visible_at(ptr) {
            return Err(DbError::Tombstoned { ordinal: ptr as u64 });
        }
        self.mark_deleted(ptr);
        Ok(())
    }

    fn mark_deleted(&self, ptr: usize) {
        let row_size = self.pattern.row_size();
        let voff = self.pattern.validity_offset();
        self.storage.arena().slice_mut(ptr, row_size)[voff] = b'N';
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::ColumnType;

    fn int_table() -> RowTable {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        RowTable::new(arena, vec![ColumnType::Int32], 4096, 4)
    }

    #[test]
    fn insert_tracks_record_count() {
        let t = int_table();
        for i in 0..10 {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&(i as i32).to_le_bytes());
            t.insert(&buf).unwrap();
        }
        assert_eq!(t.record_count(), 10);
    }

    #[test]
    fn select_matches_inserted_value() {
        let t = int_table();
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&42i32.to_le_bytes());
        let ord = t.insert(&buf).unwrap();
        let mut out = [0u8; 5];
        t.select(ord, &mut out).unwrap();
        assert_eq!(&out[..4], &42i32.to_le_bytes());
        assert_eq!(out[4], b'Y');
    }

    #[test]
    fn delete_hides_row_and_is_idempotent_failure() {
        let t = int_table();
        let mut buf = [0u8; 4];
        let ord = t.insert(&buf).unwrap();
        t.delete(ord).unwrap();
        let mut out = [0u8; 5];
        assert!(t.select(ord, &mut out).is_err());
        assert!(t.delete(ord).is_err());
    }

    #[test]
    fn ordinals_are_never_reused() {
        let t = int_table();
        let buf = [0u8; 4];
        let o0 = t.insert(&buf).unwrap();
        t.delete(o0).unwrap();
        let o1 = t.insert(&buf).unwrap();
        assert_ne!(o0, o1);
        assert_eq!(t.record_count(), 2);
    }

    #[test]
    fn update_is_visible_to_next_select() {
        let t = int_table();
        let buf = 1i32.to_le_bytes();
        let ord = t.insert(&buf).unwrap();
        t.update_col(ord, 0, &99i32.to_le_bytes()).unwrap();
        let mut out = [0u8; 5];
        t.select(ord, &mut out).unwrap();
        assert_eq!(&out[..4], &99i32.to_le_bytes());
    }

    #[test]
    fn pointer_keyed_ops_match_ordinal_keyed_ones() {
        let t = int_table();
        let ord = t.insert(&1i32.to_le_bytes()).unwrap();
        let ptr = t.record_ptr(ord).unwrap();

        let mut out = [0u8; 5];
        t.select_at(ptr, &mut out).unwrap();
        assert_eq!(&out[..4], &1i32.to_le_bytes());

        t.update_col_at(ptr, 0, &7i32.to_le_bytes()).unwrap();
        t.select(ord, &mut out).unwrap();
        assert_eq!(&out[..4], &7i32.to_le_bytes());

        t.delete_at(ptr).unwrap();
        assert!(t.select(ord, &mut out).is_err());
        assert!(t.select_at(ptr, &mut out).is_err());
    }
}
