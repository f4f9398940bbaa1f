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

//! Drains its child into a growable buffer in `init`, then sorts row
//! indices once with `sort_unstable_by`, comparing the declared order
//! columns lexicographically. Schema-preserving, like `Filter`.

use std::cmp::Ordering;

use crate::engine::data::ColumnType;
use crate::engine::result::ResultTable;
use crate::util::error::DbResult;

use super::Operator;

pub struct OrderBy {
    child: Box<dyn Operator>,
    order_columns: Vec<usize>,
    schema: Vec<ColumnType>,
    store: ResultTable,
    order: Vec<usize>,
    cursor: usize,
}

impl OrderBy {
    /// `order_columns` indexes the child's schema, highest priority
    /// first, and is sorted ascending.
    pub fn new(child: Box<dyn Operator>, order_columns: Vec<usize>) -> Self {
        let schema = child.schema().to_vec();
        let store = ResultTable::growable(schema.clone());
        OrderBy {
            child,
            order_columns,
            schema,
            store,
            order: Vec::new(),
            cursor: 0,
        }
    }
}

impl Operator for OrderBy {
    fn init(&mut self) -> DbResult<()> {
        self.child.init()?;
        self.store.reset();
        let mut tmp = ResultTable::one_row(self.schema.clone());
        while self.child.next(&mut tmp)? {
            let idx = self.store.push_row_grow();
            self.store.copy_row_from(idx, &tmp, 0);
        }
        self.child.close()?;

        let n = self.store.row_count();
        let mut order: Vec<usize> = (0..n).collect();
        let store = &self.store;
        let schema = &self.schema;
        let order_columns = &self.order_columns;
        order.sort_unstable_by(|&a, &b| {
            for &c in order_columns {
                let ord = schema[c].compare(store.get(a, c), store.get(b, c));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        self.order = order;
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        if self.cursor >= self.order.len() {
            return Ok(false);
        }
        let row = self.order[self.cursor];
        out.reset();
        out.push_row();
        out.copy_row_from(0, &self.store, row);
        self.cursor += 1;
        Ok(true)
    }

    fn is_end(&self) -> bool {
        self.cursor >= self.order.len()
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
    use crate::engine::mem::Arena;
    use crate::engine::row::RowTable;
    use std::rc::Rc;

    #[test]
    fn order_by_sorts_ascending() {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = Rc::new(RowTable::new(arena, vec![ColumnType::Int32], 4096, 4));
        for v in [5, 1, 4, 2, 3] {
            t.insert(&(v as i32).to_le_bytes()).unwrap();
        }
        let scan = Box::new(super::super::Scan::new(t));
        let mut ob = OrderBy::new(scan, vec![0]);
        ob.init().unwrap();
        let mut out = ResultTable::one_row(ob.schema().to_vec());
        let mut seen = Vec::new();
        while ob.next(&mut out).unwrap() {
            seen.push(i32::from_le_bytes(out.get(0, 0).try_into().unwrap()));
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }
}
