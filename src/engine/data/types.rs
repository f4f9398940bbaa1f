/*
 * Created on Tue Feb 10 2026
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

//! The closed scalar type system. Every column in every table, result
//! buffer, and catalog descriptor carries one of these. There is no
//! trait object here and no per-column heap allocation: dispatch is a
//! `match` on the enum discriminant, same cost as the type-tag switch
//! it replaces.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::util::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    CharN(usize),
    Date,
    Time,
    DateTime,
}

impl ColumnType {
    pub fn parse_name(name: &str, size: Option<usize>) -> DbResult<Self> {
        let malformed = |reason: &str| DbError::Malformed { reason: reason.to_string() };
        match name {
            "INT8" => Ok(Self::Int8),
            "INT16" => Ok(Self::Int16),
            "INT32" => Ok(Self::Int32),
            "INT64" => Ok(Self::Int64),
            "FLOAT32" => Ok(Self::Float32),
            "FLOAT64" => Ok(Self::Float64),
            "DATE" => Ok(Self::Date),
            "TIME" => Ok(Self::Time),
            "DATETIME" => Ok(Self::DateTime),
            "CHARN" => {
                let n = size.ok_or_else(|| malformed("CHARN requires a size"))?;
                if n == 0 {
                    return Err(malformed("CHARN size must be positive"));
                }
                Ok(Self::CharN(n))
            }
            other => Err(malformed(&format!("unknown column type `{other}`"))),
        }
    }

    /// On-disk (in-row) width in bytes.
    pub fn byte_width(&self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            Self::Float32 => 4,
            Self::Float64 => 8,
            Self::CharN(n) => *n,
            Self::Date | Self::Time | Self::DateTime => 8,
        }
    }

    /// Number of low-order bits available to pack into a composite
    /// hash-index fingerprint. Integral and temporal columns are
    /// bounded by their byte width; `CHARN` columns are hashed first,
    /// so the full 64-bit space is available regardless of string
    /// length.
    pub fn index_bits(&self) -> u32 {
        match self {
            Self::CharN(_) => 64,
            other => (other.byte_width() as u32 * 8).min(64),
        }
    }

    /// Copies one column value from `src` to `dst`, both at least
    /// `byte_width()` long.
    pub fn copy(&self, src: &[u8], dst: &mut [u8]) {
        let w = self.byte_width();
        dst[..w].copy_from_slice(&src[..w]);
    }

    /// Three/five-way comparison used by `Filter`, `OrderBy`, and the
    /// hash index's exact-match verification. `CHARN` compares raw
    /// bytes up to the declared size (NUL-padded, so this matches C's
    /// `strncmp` on ASCII text).
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let w = self.byte_width();
        let (a, b) = (&a[..w], &b[..w]);
        match self {
            Self::Int8 => (a[0] as i8).cmp(&(b[0] as i8)),
            Self::Int16 => i16::from_le_bytes(a.try_into().unwrap()).cmp(&i16::from_le_bytes(b.try_into().unwrap())),
            Self::Int32 => i32::from_le_bytes(a.try_into().unwrap()).cmp(&i32::from_le_bytes(b.try_into().unwrap())),
            Self::Int64 | Self::Date | Self::Time | Self::DateTime => {
                i64::from_le_bytes(a.try_into().unwrap()).cmp(&i64::from_le_bytes(b.try_into().unwrap()))
            }
            Self::Float32 => {
                let (x, y) = (f32::from_le_bytes(a.try_into().unwrap()), f32::from_le_bytes(b.try_into().unwrap()));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            Self::Float64 => {
                let (x, y) = (f64::from_le_bytes(a.try_into().unwrap()), f64::from_le_bytes(b.try_into().unwrap()));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            Self::CharN(_) => a.cmp(b),
        }
    }

    pub fn equal(&self, a: &[u8], b: &[u8]) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// The low `index_bits()` bits of this value's binary
    /// representation, for `CHARN` the DJB2 hash of its non-zero bytes
    /// up to the declared size.
    pub fn fingerprint_bits(&self, bytes: &[u8]) -> u64 {
        let w = self.byte_width();
        let bytes = &bytes[..w];
        match self {
            Self::CharN(_) => crate::util::djb2(bytes),
            Self::Float32 => f32::from_le_bytes(bytes.try_into().unwrap()).to_bits() as u64,
            Self::Float64 => f64::from_le_bytes(bytes.try_into().unwrap()).to_bits(),
            _ => {
                let mut buf = [0u8; 8];
                buf[..w].copy_from_slice(bytes);
                u64::from_le_bytes(buf)
            }
        }
    }

    /// Binary-to-text, for `ResultTable::dump`/`print` and for
    /// formatting a join/group key's text form.
    pub fn format_text(&self, bytes: &[u8]) -> String {
        let w = self.byte_width();
        let bytes = &bytes[..w];
        match self {
            Self::Int8 => (bytes[0] as i8).to_string(),
            Self::Int16 => i16::from_le_bytes(bytes.try_into().unwrap()).to_string(),
            Self::Int32 => i32::from_le_bytes(bytes.try_into().unwrap()).to_string(),
            Self::Int64 => i64::from_le_bytes(bytes.try_into().unwrap()).to_string(),
            Self::Float32 => f32::from_le_bytes(bytes.try_into().unwrap()).to_string(),
            Self::Float64 => f64::from_le_bytes(bytes.try_into().unwrap()).to_string(),
            Self::CharN(_) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                String::from_utf8_lossy(&bytes[..end]).into_owned()
            }
            Self::Date => {
                let secs = i64::from_le_bytes(bytes.try_into().unwrap());
                epoch_date(secs).format("%Y-%m-%d").to_string()
            }
            Self::Time => {
                let secs = i64::from_le_bytes(bytes.try_into().unwrap());
                seconds_to_time(secs).format("%H:%M:%S").to_string()
            }
            Self::DateTime => {
                let secs = i64::from_le_bytes(bytes.try_into().unwrap());
                epoch_datetime(secs).format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
    }

    /// Text-to-binary, writing exactly `byte_width()` bytes into `dst`.
    /// Returns `ConversionOutOfRange` for a numeric literal that
    /// doesn't fit, or for text that fails to parse against the
    /// expected format.
    pub fn format_binary(&self, text: &str, dst: &mut [u8]) -> DbResult<()> {
        let w = self.byte_width();
        let oor = || DbError::ConversionOutOfRange {
            type_name: self.name(),
            text: text.to_string(),
        };
        match self {
            Self::Int8 => dst[..w].copy_from_slice(&[text.trim().parse::<i8>().map_err(|_| oor())? as u8]),
            Self::Int16 => dst[..w].copy_from_slice(&text.trim().parse::<i16>().map_err(|_| oor())?.to_le_bytes()),
            Self::Int32 => dst[..w].copy_from_slice(&text.trim().parse::<i32>().map_err(|_| oor())?.to_le_bytes()),
            Self::Int64 => dst[..w].copy_from_slice(&text.trim().parse::<i64>().map_err(|_| oor())?.to_le_bytes()),
            Self::Float32 => dst[..w].copy_from_slice(&text.trim().parse::<f32>().map_err(|_| oor())?.to_le_bytes()),
            Self::Float64 => dst[..w].copy_from_slice(&text.trim().parse::<f64>().map_err(|_| oor())?.to_le_bytes()),
            Self::CharN(n) => {
                let bytes = text.as_bytes();
                let copy_len = bytes.len().min(*n);
                dst[..copy_len].copy_from_slice(&bytes[..copy_len]);
                for b in dst[copy_len..*n].iter_mut() {
                    *b = 0;
                }
            }
            Self::Date => {
                let d = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| oor())?;
                let secs = (d - epoch_naive_date()).num_seconds();
                dst[..w].copy_from_slice(&secs.to_le_bytes());
            }
            Self::Time => {
                let t = NaiveTime::parse_from_str(text.trim(), "%H:%M:%S").map_err(|_| oor())?;
                let secs = t.num_seconds_from_midnight() as i64;
                dst[..w].copy_from_slice(&secs.to_le_bytes());
            }
            Self::DateTime => {
                let dt = NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S").map_err(|_| oor())?;
                let secs = (dt - epoch_naive_datetime()).num_seconds();
                dst[..w].copy_from_slice(&secs.to_le_bytes());
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "INT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::CharN(_) => "CHARN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    /// Adds `other` (as an `f64`) into `acc` (stored as the type's own
    /// binary representation), used by `SUM`/`AVG` accumulation in
    /// `GroupBy`. Returns the updated accumulator as `f64`; the caller
    /// holds accumulators as `f64` regardless of the column's declared
    /// numeric type and narrows only when writing the final row.
    pub fn as_f64(&self, bytes: &[u8]) -> f64 {
        let w = self.byte_width();
        let bytes = &bytes[..w];
        match self {
            Self::Int8 => (bytes[0] as i8) as f64,
            Self::Int16 => i16::from_le_bytes(bytes.try_into().unwrap()) as f64,
            Self::Int32 => i32::from_le_bytes(bytes.try_into().unwrap()) as f64,
            Self::Int64 => i64::from_le_bytes(bytes.try_into().unwrap()) as f64,
            Self::Float32 => f32::from_le_bytes(bytes.try_into().unwrap()) as f64,
            Self::Float64 => f64::from_le_bytes(bytes.try_into().unwrap()),
            _ => 0.0,
        }
    }

    pub fn write_f64(&self, value: f64, dst: &mut [u8]) {
        let w = self.byte_width();
        match self {
            Self::Int8 => dst[..w].copy_from_slice(&[(value as i64) as u8]),
            Self::Int16 => dst[..w].copy_from_slice(&(value as i16).to_le_bytes()),
            Self::Int32 => dst[..w].copy_from_slice(&(value as i32).to_le_bytes()),
            Self::Int64 => dst[..w].copy_from_slice(&(value as i64).to_le_bytes()),
            Self::Float32 => dst[..w].copy_from_slice(&(value as f32).to_le_bytes()),
            Self::Float64 => dst[..w].copy_from_slice(&value.to_le_bytes()),
            _ => {}
        }
    }
}

use chrono::Timelike;

fn epoch_naive_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

fn epoch_naive_datetime() -> NaiveDateTime {
    epoch_naive_date().and_hms_opt(0, 0, 0).unwrap()
}

fn epoch_date(secs: i64) -> NaiveDate {
    epoch_naive_date() + chrono::Duration::seconds(secs)
}

fn epoch_datetime(secs: i64) -> NaiveDateTime {
    epoch_naive_datetime() + chrono::Duration::seconds(secs)
}

fn seconds_to_time(secs: i64) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt((secs.rem_euclid(86400)) as u32, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_roundtrip() {
        let ty = ColumnType::Int32;
        let mut buf = [0u8; 4];
        ty.format_binary("-42", &mut buf).unwrap();
        assert_eq!(ty.format_text(&buf), "-42");
    }

    #[test]
    fn int8_out_of_range() {
        let ty = ColumnType::Int8;
        let mut buf = [0u8; 1];
        assert!(ty.format_binary("200", &mut buf).is_err());
    }

    #[test]
    fn charn_compare_is_prefix_bounded() {
        let ty = ColumnType::CharN(8);
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        ty.format_binary("alice", &mut a).unwrap();
        ty.format_binary("alicia", &mut b).unwrap();
        assert_eq!(ty.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn date_roundtrip() {
        let ty = ColumnType::Date;
        let mut buf = [0u8; 8];
        ty.format_binary("2026-02-10", &mut buf).unwrap();
        assert_eq!(ty.format_text(&buf), "2026-02-10");
    }

    #[test]
    fn datetime_roundtrip() {
        let ty = ColumnType::DateTime;
        let mut buf = [0u8; 8];
        ty.format_binary("2026-02-10 13:45:09", &mut buf).unwrap();
        assert_eq!(ty.format_text(&buf), "2026-02-10 13:45:09");
    }

    #[test]
    fn time_roundtrip() {
        let ty = ColumnType::Time;
        let mut buf = [0u8; 8];
        ty.format_binary("23:59:01", &mut buf).unwrap();
        assert_eq!(ty.format_text(&buf), "23:59:01");
    }
}
