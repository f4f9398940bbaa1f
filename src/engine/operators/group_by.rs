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

//! Drains its child once in `init`, hashing each row's group-key
//! columns (DJB2 over their concatenated text forms, same scheme as
//! `HashJoin`'s key hash) into a local table that maps to a discovery-
//! ordered group list. `COUNT`/`SUM`/`AVG`/`MAX`/`MIN` accumulate
//! incrementally as rows arrive; `AVG` keeps a running sum during the
//! drain and divides by the final count once, in `init`'s finalize
//! step, rather than after every row.
//!
//! Each aggregate method is independent of the others: requesting both
//! `SUM(x)` and `AVG(x)` in one query keeps two separate accumulators,
//! there is no shared running-sum state reused across methods.

use std::rc::Rc;

use crate::engine::data::ColumnType;
use crate::engine::idx::{HashTable, DEFAULT_MIN_ARRAY_CAPACITY, DEFAULT_NUM_BUCKETS};
use crate::engine::mem::Arena;
use crate::engine::plan::AggregateMethod;
use crate::engine::result::ResultTable;
use crate::util::djb2;
use crate::util::error::DbResult;

use super::Operator;

#[derive(Debug, Clone, Copy)]
pub enum GroupOutputColumn {
    /// A plain group-key column, indexing the child's schema.
    Key(usize),
    /// An aggregate over a child column.
    Aggregate(usize, AggregateMethod),
}

struct GroupState {
    keys: Vec<Vec<u8>>,
    count: u64,
    acc: Vec<Option<Vec<u8>>>,
}

pub struct GroupBy {
    child: Box<dyn Operator>,
    outputs: Vec<GroupOutputColumn>,
    key_position: Vec<Option<usize>>,
    schema: Vec<ColumnType>,
    arena: Rc<Arena>,
    groups: Vec<GroupState>,
    cursor: usize,
}

fn init_accumulator(ty: ColumnType, method: AggregateMethod, bytes: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; ty.byte_width()];
    match method {
        AggregateMethod::Sum | AggregateMethod::Avg => ty.write_f64(ty.as_f64(bytes), &mut buf),
        AggregateMethod::Max | AggregateMethod::Min => buf.copy_from_slice(bytes),
        AggregateMethod::Count | AggregateMethod::None => {}
    }
    buf
}

fn update_accumulator(ty: ColumnType, method: AggregateMethod, acc: &mut [u8], bytes: &[u8]) {
    match method {
        AggregateMethod::Sum | AggregateMethod::Avg => {
            let sum = ty.as_f64(acc) + ty.as_f64(bytes);
            ty.write_f64(sum, acc);
        }
        AggregateMethod::Max => {
            if ty.compare(bytes, acc) == std::cmp::Ordering::Greater {
                acc.copy_from_slice(bytes);
            }
        }
        AggregateMethod::Min => {
            if ty.compare(bytes, acc) == std::cmp::Ordering::Less {
                acc.copy_from_slice(bytes);
            }
        }
        AggregateMethod::Count | AggregateMethod::None => {}
    }
}

impl GroupBy {
    pub fn new(arena: Rc<Arena>, child: Box<dyn Operator>, outputs: Vec<GroupOutputColumn>) -> Self {
        let child_schema = child.schema().to_vec();
        let mut key_position = vec![None; outputs.len()];
        let mut next_key_pos = 0usize;
        let mut schema = Vec::with_capacity(outputs.len());
        for (i, out) in outputs.iter().enumerate() {
            match out {
                GroupOutputColumn::Key(c) => {
                    key_position[i] = Some(next_key_pos);
                    next_key_pos += 1;
                    schema.push(child_schema[*c]);
                }
                GroupOutputColumn::Aggregate(c, AggregateMethod::Count) => {
                    let _ = c;
                    schema.push(ColumnType::Int64);
                }
                GroupOutputColumn::Aggregate(c, _) => schema.push(child_schema[*c]),
            }
        }
        GroupBy {
            child,
            outputs,
            key_position,
            schema,
            arena,
            groups: Vec::new(),
            cursor: 0,
        }
    }

    fn key_columns(&self) -> Vec<usize> {
        self.outputs
            .iter()
            .filter_map(|o| if let GroupOutputColumn::Key(c) = o { Some(*c) } else { None })
            .collect()
    }
}

impl Operator for GroupBy {
    fn init(&mut self) -> DbResult<()> {
        self.child.init()?;
        let child_schema = self.child.schema().to_vec();
        let key_columns = self.key_columns();
        let table = HashTable::new(Rc::clone(&self.arena), DEFAULT_NUM_BUCKETS, DEFAULT_MIN_ARRAY_CAPACITY);
        self.groups.clear();

        let mut tmp = ResultTable::one_row(child_schema.clone());
        while self.child.next(&mut tmp)? {
            let keys: Vec<Vec<u8>> = key_columns.iter().map(|&c| tmp.get(0, c).to_vec()).collect();
            let mut key_text = String::new();
            for (&c, k) in key_columns.iter().zip(&keys) {
                key_text.push_str(&child_schema[c].format_text(k));
            }
            let hash = djb2(key_text.as_bytes());

            let mut found = None;
            let mut out = [0usize; 8];
            let mut n = table.probe(hash, &mut out);
            'search: loop {
                let slice: &[usize] = if n >= 0 { &out[..n as usize] } else { &out };
                for &gi in slice {
                    if self.groups[gi].keys == keys {
                        found = Some(gi);
                        break 'search;
                    }
                }
                if n >= 0 {
                    break;
                }
                n = table.probe_contd(hash, (-n) as usize, &mut out);
            }

            match found {
                Some(gi) => {
                    let group = &mut self.groups[gi];
                    group.count += 1;
                    for (i, out_col) in self.outputs.iter().enumerate() {
                        if let GroupOutputColumn::Aggregate(c, method) = out_col {
                            let ty = child_schema[*c];
                            let bytes = tmp.get(0, *c).to_vec();
                            let acc = group.acc[i].get_or_insert_with(|| init_accumulator(ty, *method, &bytes));
                            if group.count > 1 {
                                update_accumulator(ty, *method, acc, &bytes);
                            }
                        }
                    }
                }
                None => {
                    let gi = self.groups.len();
                    let mut acc = vec![None; self.outputs.len()];
                    for (i, out_col) in self.outputs.iter().enumerate() {
                        if let GroupOutputColumn::Aggregate(c, method) = out_col {
                            let ty = child_schema[*c];
                            acc[i] = Some(init_accumulator(ty, *method, tmp.get(0, *c)));
                        }
                    }
                    self.groups.push(GroupState { keys, count: 1, acc });
                    table.add(hash, gi)?;
                }
            }
        }
        self.child.close()?;

        for (i, out_col) in self.outputs.iter().enumerate() {
            if let GroupOutputColumn::Aggregate(c, AggregateMethod::Avg) = out_col {
                let ty = child_schema[*c];
                for g in &mut self.groups {
                    if let Some(acc) = &mut g.acc[i] {
                        let avg = ty.as_f64(acc) / (g.count as f64);
                        ty.write_f64(avg, acc);
                    }
                }
            }
        }

        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        if self.cursor >= self.groups.len() {
            return Ok(false);
        }
        let g = &self.groups[self.cursor];
        out.reset();
        out.push_row();
        for (i, out_col) in self.outputs.iter().enumerate() {
            match out_col {
                GroupOutputColumn::Key(_) => {
                    let pos = self.key_position[i].expect("key output must have a key position");
                    out.set(0, i, &g.keys[pos]);
                }
                GroupOutputColumn::Aggregate(_, AggregateMethod::Count) => {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(&(g.count as i64).to_le_bytes());
                    out.set(0, i, &buf);
                }
                GroupOutputColumn::Aggregate(_, _) => {
                    let bytes = g.acc[i].clone().unwrap_or_default();
                    out.set(0, i, &bytes);
                }
            }
        }
        self.cursor += 1;
        Ok(true)
    }

    fn is_end(&self) -> bool {
        self.cursor >= self.groups.len()
    }

    fn close(&mut self) -> DbResult<()> {
        Ok(())
    }

    fn schema(&self) -> &[ColumnType] {
        &self.schema
    }

    fn size_hint(&self) -> usize {
        self.child.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::row::RowTable;

    #[test]
    fn group_by_sum_and_count() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let t = Rc::new(RowTable::new(Rc::clone(&arena), vec![ColumnType::Int32, ColumnType::Int32], 4096, 4));
        for (k, v) in [(1, 10), (2, 5), (1, 20), (2, 7), (1, 1)] {
            t.insert_columns(&[&(k as i32).to_le_bytes(), &(v as i32).to_le_bytes()]).unwrap();
        }
        let scan = Box::new(super::super::Scan::new(t));
        let mut gb = GroupBy::new(
            Rc::clone(&arena),
            scan,
            vec![
                GroupOutputColumn::Key(0),
                GroupOutputColumn::Aggregate(1, AggregateMethod::Sum),
                GroupOutputColumn::Aggregate(1, AggregateMethod::Count),
            ],
        );
        gb.init().unwrap();
        let mut out = ResultTable::one_row(gb.schema().to_vec());
        let mut rows = Vec::new();
        while gb.next(&mut out).unwrap() {
            let key = i32::from_le_bytes(out.get(0, 0).try_into().unwrap());
            let sum = i32::from_le_bytes(out.get(0, 1).try_into().unwrap());
            let count = i64::from_le_bytes(out.get(0, 2).try_into().unwrap());
            rows.push((key, sum, count));
        }
        rows.sort_unstable();
        assert_eq!(rows, vec![(1, 31, 3), (2, 12, 2)]);
    }

    #[test]
    fn group_by_avg_divides_by_final_count() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let t = Rc::new(RowTable::new(Rc::clone(&arena), vec![ColumnType::Int32, ColumnType::Float64], 4096, 4));
        for v in [2.0, 4.0, 9.0] {
            t.insert_columns(&[&1i32.to_le_bytes(), &v.to_le_bytes()]).unwrap();
        }
        let scan = Box::new(super::super::Scan::new(t));
        let mut gb = GroupBy::new(
            Rc::clone(&arena),
            scan,
            vec![GroupOutputColumn::Key(0), GroupOutputColumn::Aggregate(1, AggregateMethod::Avg)],
        );
        gb.init().unwrap();
        let mut out = ResultTable::one_row(gb.schema().to_vec());
        assert!(gb.next(&mut out).unwrap());
        let avg = f64::from_le_bytes(out.get(0, 1).try_into().unwrap());
        assert!((avg - 5.0).abs() < 1e-9);
        assert!(!gb.next(&mut out).unwrap());
    }
}
