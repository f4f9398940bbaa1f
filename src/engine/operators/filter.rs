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

//! Evaluates one comparison against a constant, re-pulling from its
//! child until a row passes or the child ends. Schema-preserving: a
//! filtered row is the child's row, untouched.

use std::cmp::Ordering;

use crate::engine::data::ColumnType;
use crate::engine::plan::CompareOp;
use crate::engine::result::ResultTable;
use crate::util::error::DbResult;

use super::Operator;

pub struct Filter {
    child: Box<dyn Operator>,
    column: usize,
    op: CompareOp,
    constant: Vec<u8>,
}

impl Filter {
    /// `column` indexes the child's schema; `constant` must already be
    /// encoded in that column's binary form (see
    /// `ColumnType::format_binary`).
    pub fn new(child: Box<dyn Operator>, column: usize, op: CompareOp, constant: Vec<u8>) -> Self {
        Filter { child, column, op, constant }
    }
}

impl Operator for Filter {
    fn init(&mut self) -> DbResult<()> {
        self.child.init()
    }

    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool> {
        loop {
            if !self.child.next(out)? {
                return Ok(false);
            }
            let ty = self.child.schema()[self.column];
            let ord = ty.compare(out.get(0, self.column), &self.constant);
            let pass = match self.op {
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::Le => ord != Ordering::Greater,
                CompareOp::Eq => ord == Ordering::Equal,
                CompareOp::Ne => ord != Ordering::Equal,
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::Ge => ord != Ordering::Less,
                CompareOp::Link => true,
            };
            if pass {
                return Ok(true);
            }
        }
    }

    fn is_end(&self) -> bool {
        self.child.is_end()
    }

    fn close(&mut self) -> DbResult<()> {
        self.child.close()
    }

    fn schema(&self) -> &[ColumnType] {
        self.child.schema()
    }

    fn size_hint(&self) -> usize {
        self.child.size_hint()
    }
}
