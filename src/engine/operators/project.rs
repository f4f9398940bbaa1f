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

//! Reorders and narrows a child's columns by rank, the shape a SELECT
//! column list needs.

use crate::engine::data::ColumnType;
use crate::engine::result::ResultTable;
use crate::util::error::DbResult;

use super::Operator;

pub struct Project {
    child: Box<dyn Operator>,
    columns: Vec<usize>,
    schema: Vec<ColumnType>,
    child_buf: ResultTable,
}

impl Project {
    /// `columns` indexes the child's schema, in output order.
    pub fn new(child: Box<dyn Operator>, columns: Vec<usize>) -> Self {
        let schema = columns.iter().map(|&c| child.schema()[c]).collect();
        let child_buf = ResultTable::one_row(child.schema().to_vec());
        Project {
            child,
            columns,
            schema,
            child_buf,
        }
    }
}

impl Operator for Project {
    fn init(&mut self) -> DbResult<()> {
        self.child.init()
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        if !self.child.next(&mut self.child_buf)? {
            return Ok(false);
        }
        out.reset();
        out.push_row();
        for (i, &col) in self.columns.iter().enumerate() {
            let bytes = self.child_buf.get(0, col).to_vec();
            out.set(0, i, &bytes);
        }
        Ok(true)
    }

    fn is_end(&self) -> bool {
        self.child.is_end()
    }

    fn close(&mut self) -> DbResult<()> {
        self.child.close()
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
    fn project_reorders_columns() {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = Rc::new(RowTable::new(arena, vec![ColumnType::Int32, ColumnType::Int32], 4096, 4));
        t.insert_columns(&[&1i32.to_le_bytes(), &2i32.to_le_bytes()]).unwrap();
        let scan = Box::new(super::super::Scan::new(t));
        let mut p = Project::new(scan, vec![1, 0]);
        p.init().unwrap();
        let mut out = ResultTable::one_row(p.schema().to_vec());
        assert!(p.next(&mut out).unwrap());
        assert_eq!(i32::from_le_bytes(out.get(0, 0).try_into().unwrap()), 2);
        assert_eq!(i32::from_le_bytes(out.get(0, 1).try_into().unwrap()), 1);
    }
}
