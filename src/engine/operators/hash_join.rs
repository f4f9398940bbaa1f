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

//! Classic build/probe inner join. The side with the larger
//! `size_hint` at construction becomes the probe side, matching the
//! smaller side's rows against a local hash table built once in
//! `init`. Unlike `HashIndex`, there is no arena-backed row table on
//! the build side to point into: the probe side isn't guaranteed to be
//! a bare `Scan`, so the build side is materialized wholesale into a
//! growable `ResultTable` and the local table's payload is just a row
//! index into it.

use std::rc::Rc;

use crate::engine::data::ColumnType;
use crate::engine::idx::{HashTable, DEFAULT_MIN_ARRAY_CAPACITY, DEFAULT_NUM_BUCKETS};
use crate::engine::mem::Arena;
use crate::engine::result::ResultTable;
use crate::util::error::DbResult;
use crate::util::djb2;

use super::Operator;

fn join_key_hash(ty: ColumnType, bytes: &[u8]) -> u64 {
    djb2(ty.format_text(bytes).as_bytes())
}

pub struct HashJoin {
    probe: Box<dyn Operator>,
    build: Box<dyn Operator>,
    probe_col: usize,
    build_col: usize,
    join_type: ColumnType,
    arena: Rc<Arena>,
    schema: Vec<ColumnType>,
    probe_width: usize,
    build_store: ResultTable,
    local_table: Option<HashTable>,
    probe_buf: ResultTable,
    candidates: Vec<usize>,
    candidate_idx: usize,
    ended: bool,
    left_was_probe: bool,
}

impl HashJoin {
    /// `left`/`right` are matched on `left_col`/`right_col` (indices
    /// into each side's own schema). The side reporting the larger
    /// `size_hint()` becomes the probe side.
    pub fn new(
        arena: Rc<Arena>,
        left: Box<dyn Operator>,
        left_col: usize,
        right: Box<dyn Operator>,
        right_col: usize,
    ) -> Self {
        let left_was_probe = left.size_hint() >= right.size_hint();
        let (probe, probe_col, build, build_col) = if left_was_probe {
            (left, left_col, right, right_col)
        } else {
            (right, right_col, left, left_col)
        };
        let join_type = probe.schema()[probe_col];
        let probe_width = probe.schema().len();
        let mut schema = probe.schema().to_vec();
        schema.extend_from_slice(build.schema());
        let probe_buf = ResultTable::one_row(probe.schema().to_vec());
        let build_store = ResultTable::growable(build.schema().to_vec());
        HashJoin {
            probe,
            build,
            probe_col,
            build_col,
            join_type,
            arena,
            schema,
            probe_width,
            build_store,
            local_table: None,
            probe_buf,
            candidates: Vec::new(),
            candidate_idx: 0,
            ended: false,
            left_was_probe,
        }
    }

    /// Whether the `left` argument to `new` ended up as the probe side
    /// (and therefore occupies the first segment of `schema()`). Used
    /// by the executor to track column positions through a chain of
    /// joins without re-deriving the probe/build choice.
    pub fn left_was_probe(&self) -> bool {
        self.left_was_probe
    }

    fn pull_probe_row(&mut self) -> DbResult<bool> {
        if !self.probe.next(&mut self.probe_buf)? {
            return Ok(false);
        }
        let probe_val = self.probe_buf.get(0, self.probe_col).to_vec();
        let hash = join_key_hash(self.join_type, &probe_val);
        let table = self.local_table.as_ref().expect("init must run before next");
        let mut out = [0usize; 8];
        let mut n = table.probe(hash, &mut out);
        let mut raw = Vec::new();
        loop {
            if n >= 0 {
                raw.extend_from_slice(&out[..n as usize]);
                break;
            }
            raw.extend_from_slice(&out);
            n = table.probe_contd(hash, (-n) as usize, &mut out);
        }
        self.candidates = raw
            .into_iter()
            .filter(|&row| self.join_type.equal(self.build_store.get(row, self.build_col), &probe_val))
            .collect();
        self.candidate_idx = 0;
        Ok(true)
    }
}

impl Operator for HashJoin {
    fn init(&mut self) -> DbResult<()> {
        self.build.init()?;
        self.build_store.reset();
        let build_schema_len = self.build.schema().len();
        let mut tmp = ResultTable::one_row(self.build.schema().to_vec());
        while self.build.next(&mut tmp)? {
            let idx = self.build_store.push_row_grow();
            self.build_store.copy_row_from(idx, &tmp, 0);
        }
        self.build.close()?;
        let table = HashTable::new(Rc::clone(&self.arena), DEFAULT_NUM_BUCKETS, DEFAULT_MIN_ARRAY_CAPACITY);
        for row in 0..self.build_store.row_count() {
            let hash = join_key_hash(self.join_type, self.build_store.get(row, self.build_col));
            table.add(hash, row)?;
        }
        let _ = build_schema_len;
        self.local_table = Some(table);
        self.probe.init()?;
        self.candidates.clear();
        self.candidate_idx = 0;
        self.ended = false;
        Ok(())
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        loop {
            if self.candidate_idx < self.candidates.len() {
                let build_row = self.candidates[self.candidate_idx];
                self.candidate_idx += 1;
                out.reset();
                out.push_row();
                for c in 0..self.probe_width {
                    let bytes = self.probe_buf.get(0, c).to_vec();
                    out.set(0, c, &bytes);
                }
                for c in 0..(self.schema.len() - self.probe_width) {
                    let bytes = self.build_store.get(build_row, c).to_vec();
                    out.set(0, self.probe_width + c, &bytes);
                }
                return Ok(true);
            }
            if !self.pull_probe_row()? {
                self.ended = true;
                return Ok(false);
            }
        }
    }

    fn is_end(&self) -> bool {
        self.ended
    }

    fn close(&mut self) -> DbResult<()> {
        self.probe.close()
    }

    fn schema(&self) -> &[ColumnType] {
        &self.schema
    }

    fn size_hint(&self) -> usize {
        self.probe.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::row::RowTable;

    fn table_with(values: &[i32]) -> Rc<RowTable> {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = Rc::new(RowTable::new(arena, vec![ColumnType::Int32], 4096, 4));
        for &v in values {
            t.insert(&v.to_le_bytes()).unwrap();
        }
        t
    }

    #[test]
    fn inner_join_matches_on_equal_keys() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let left = Box::new(super::super::Scan::new(table_with(&[1, 2, 3])));
        let right = Box::new(super::super::Scan::new(table_with(&[2, 3, 4])));
        let mut join = HashJoin::new(Rc::clone(&arena), left, 0, right, 0);
        join.init().unwrap();
        let mut out = ResultTable::one_row(join.schema().to_vec());
        let mut pairs = Vec::new();
        while join.next(&mut out).unwrap() {
            let a = i32::from_le_bytes(out.get(0, 0).try_into().unwrap());
            let b = i32::from_le_bytes(out.get(0, 1).try_into().unwrap());
            pairs.push((a, b));
        }
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(2, 2), (3, 3)]);
    }
}
