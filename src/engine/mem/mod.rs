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

pub mod arena;

pub use arena::Arena;

/// Default arena sizing, matching the reference engine's defaults:
/// 64 pages of 4096 bytes each as the row storage's initial directory
/// capacity and page size (see `engine::row::storage`).
pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_DIRECTORY_CAPACITY: usize = 64;
