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

//! The pull ("Volcano") operator interface and its six implementations.
//! The source used inheritance from a shared base; here every operator
//! is a sum-of-structs behind one trait object per node, and every
//! node owns its children outright (a tree, never a DAG): `close`
//! recurses into the subtree it owns.

pub mod filter;
pub mod group_by;
pub mod hash_join;
pub mod order_by;
pub mod project;
pub mod scan;

pub use filter::Filter;
pub use group_by::{GroupBy, GroupOutputColumn};
pub use hash_join::HashJoin;
pub use order_by::OrderBy;
pub use project::Project;
pub use scan::Scan;

use crate::engine::data::ColumnType;
use crate::engine::result::ResultTable;
use crate::util::error::DbResult;

/// A node in the executor's operator tree. `next` writes exactly one
/// row into `out` (sized for one row, same schema as `self.schema()`)
/// and reports whether a row was produced; `false` means "no more
/// rows for this call", which is either genuine end-of-stream
/// (`is_end() == true` afterwards) or, for an error, propagated as
/// `Err` instead.
pub trait Operator {
    fn init(&mut self) -> DbResult<()>;
    fn next(&mut self, out: &mut ResultTable) -> DbResult<bool>;
    fn is_end(&self) -> bool;
    fn close(&mut self) -> DbResult<()>;
    fn schema(&self) -> &[ColumnType];

    /// A rough row-count estimate used only to pick the build/probe
    /// sides of a `HashJoin` before `init` has run anywhere in the
    /// tree. Scan answers exactly; everything else forwards its
    /// child's estimate.
    fn size_hint(&self) -> usize;
}
