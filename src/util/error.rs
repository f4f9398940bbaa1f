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

use std::fmt;

/// Every failure mode the engine can report, from allocator exhaustion
/// up through plan validation. There is no retry path anywhere in this
/// crate: a `DbError` always ends the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    ArenaExhausted,
    DirectoryExhausted,
    InvalidOrdinal { ordinal: u64, record_count: u64 },
    Tombstoned { ordinal: u64 },
    UnknownObject { name: String },
    DuplicateName { name: String },
    UnsupportedTableType,
    UnsupportedIndexType,
    MissingDatabase,
    UnknownColumn { table: String, column: String },
    ConversionOutOfRange { type_name: &'static str, text: String },
    Malformed { reason: String },
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArenaExhausted => write!(f, "arena exhausted: backing region has no room left for this allocation"),
            Self::DirectoryExhausted => write!(f, "row storage directory could not grow to hold another page"),
            Self::InvalidOrdinal { ordinal, record_count } => {
                write!(f, "ordinal {ordinal} is out of range (record count is {record_count})")
            }
            Self::Tombstoned { ordinal } => write!(f, "row {ordinal} has been deleted"),
            Self::UnknownObject { name } => write!(f, "no catalog object named `{name}`"),
            Self::DuplicateName { name } => write!(f, "an object named `{name}` already exists"),
            Self::UnsupportedTableType => write!(f, "only ROWTABLE tables are supported"),
            Self::UnsupportedIndexType => write!(f, "only HASHINDEX indexes are supported"),
            Self::MissingDatabase => write!(f, "no database is open"),
            Self::UnknownColumn { table, column } => write!(f, "table `{table}` has no column `{column}`"),
            Self::ConversionOutOfRange { type_name, text } => {
                write!(f, "`{text}` is out of range for {type_name}")
            }
            Self::Malformed { reason } => write!(f, "malformed input: {reason}"),
        }
    }
}

impl std::error::Error for DbError {}

pub type DbResult<T> = Result<T, DbError>;
