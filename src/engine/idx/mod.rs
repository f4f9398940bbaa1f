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

pub mod hash_index;
pub mod hash_table;

pub use hash_index::HashIndex;
pub use hash_table::HashTable;

/// Default fixed bucket array size and minimum per-bucket overflow
/// array capacity, used unless a schema index overrides them.
pub const DEFAULT_NUM_BUCKETS: usize = 200_000;
pub const DEFAULT_MIN_ARRAY_CAPACITY: usize = 4;
