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

//! The structured plan descriptor the executor builds an operator tree
//! from. There is no SQL parser anywhere in this crate: plans arrive
//! already shaped like this, typically built by a test harness or an
//! embedding caller.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
    /// Not a comparison at all: marks a join predicate between two
    /// columns rather than a column and a literal.
    Link,
}

#[derive(Debug, Clone)]
pub enum Rhs {
    Literal(String),
    Column(String),
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub rhs: Rhs,
}

impl Condition {
    pub fn is_link(&self) -> bool {
        self.op == CompareOp::Link
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMethod {
    None,
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

#[derive(Debug, Clone)]
pub struct SelectColumn {
    pub column: String,
    pub aggregate: AggregateMethod,
}

impl SelectColumn {
    pub fn plain(column: impl Into<String>) -> Self {
        SelectColumn {
            column: column.into(),
            aggregate: AggregateMethod::None,
        }
    }

    pub fn aggregated(column: impl Into<String>, aggregate: AggregateMethod) -> Self {
        SelectColumn {
            column: column.into(),
            aggregate,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub database: String,
    pub select_columns: Vec<SelectColumn>,
    pub from_tables: Vec<String>,
    pub where_conditions: Vec<Condition>,
    pub groupby_columns: Vec<String>,
    pub having_conditions: Vec<Condition>,
    pub orderby_columns: Vec<String>,
}

impl SelectQuery {
    pub fn new(database: impl Into<String>) -> Self {
        SelectQuery {
            database: database.into(),
            ..Default::default()
        }
    }
}
