/*
 * Created on Mon Feb 09 2026
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

//! The storage and execution core: arena, row storage, hash table and
//! index, the operator tree, and the executor that drives it. Nothing
//! in this module tree touches a file or the command line; that's
//! `loader` and `config`'s job.

pub mod catalog;
pub mod data;
pub mod executor;
pub mod idx;
pub mod mem;
pub mod operators;
pub mod plan;
pub mod result;
pub mod row;

pub use catalog::Catalog;
pub use executor::Executor;
pub use mem::Arena;
pub use result::ResultTable;
