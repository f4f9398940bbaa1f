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

//! A two-level slot array over the arena: a directory of page offsets,
//! each page holding a fixed number of fixed-size rows. Pages are
//! carved from the arena lazily, on first write; the directory itself
//! is a plain growable vector of `Option<offset>` (doubled explicitly
//! rather than relying on `Vec`'s own growth policy, so the "old page
//! pointers remain valid" invariant is visibly about arena offsets,
//! not about the directory's own backing memory).

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::mem::Arena;
use crate::util::error::{DbError, DbResult};

pub struct MStorage {
    arena: Rc<Arena>,
    row_size: usize,
    page_size: usize,
    rows_per_page: usize,
    directory: RefCell<Vec<Option<usize>>>,
}

impl MStorage {
    pub fn new(arena: Rc<Arena>, row_size: usize, page_size: usize, initial_directory_capacity: usize) -> Self {
        let rows_per_page = (page_size / row_size).max(1);
        MStorage {
            arena,
            row_size,
            page_size,
            rows_per_page,
            directory: RefCell::new(vec![None; initial_directory_capacity.max(1)]),
        }
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn arena(&self) -> &Rc<Arena> {
        &self.arena
    }

    fn ensure_directory(&self, page_idx: usize) -> DbResult<()> {
        let mut dir = self.directory.borrow_mut();
        if page_idx < dir.len() {
            return Ok(());
        }
        let mut new_len = dir.len().max(1);
        while page_idx >= new_len {
            let doubled = new_len.checked_mul(2).ok_or(DbError::DirectoryExhausted)?;
            new_len = doubled;
        }
        dir.resize(new_len, None);
        Ok(())
    }

    /// Returns the arena offset of `ordinal`'s row, allocating its page
    /// if this is the first write to it.
    pub fn row_ptr(&self, ordinal: usize) -> DbResult<usize> {
        let page_idx = ordinal / self.rows_per_page;
        let row_in_page = ordinal % self.rows_per_page;
        self.ensure_directory(page_idx)?;
        let page_offset = {
            let existing = self.directory.borrow()[page_idx];
            match existing {
                Some(off) => off,
                None => {
                    let off = self.arena.alloc(self.page_size)?;
                    self.directory.borrow_mut()[page_idx] = Some(off);
                    off
                }
            }
        };
        Ok(page_offset + row_in_page * self.row_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_doubles_and_old_pages_stay_valid() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let storage = MStorage::new(Rc::clone(&arena), 16, 64, 2);
        let rows_per_page = storage.rows_per_page();
        let p0 = storage.row_ptr(0).unwrap();
        let far_ordinal = rows_per_page * 10;
        let _ = storage.row_ptr(far_ordinal).unwrap();
        assert_eq!(storage.row_ptr(0).unwrap(), p0);
    }

    #[test]
    fn same_ordinal_is_stable() {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let storage = MStorage::new(arena, 8, 64, 4);
        let a = storage.row_ptr(5).unwrap();
        let b = storage.row_ptr(5).unwrap();
        assert_eq!(a, b);
    }
}
