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

//! A fixed bucket array where each bucket carries either one inline
//! `(hash, ptr)` pair or a pointer to a growable array of pairs. This
//! is the union from the allocator this engine replaces, reshaped into
//! an explicit Rust sum type (see the design note on "hash-bucket
//! union" in the project's requirements): `Bucket::Inline` is the
//! common single-entry case, `Bucket::Array` the overflow case, and
//! the two never coexist for one bucket at a time.
//!
//! Per-bucket arrays are carved from and returned to the same arena
//! the rest of the engine uses; since `Arena::alloc`/`Arena::free`
//! already recycle by power-of-two size class, that is exactly the
//! per-size-class array freelist this table needs; no second freelist
//! is kept here.

use std::cell::Cell;
use std::mem::size_of;
use std::rc::Rc;

use crate::engine::mem::Arena;
use crate::util::error::DbResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
struct Pair {
    hash: u64,
    ptr: usize,
}

#[derive(Debug, Clone, Copy)]
enum Bucket {
    Empty,
    Inline(Pair),
    Array { offset: usize, capacity: usize, count: usize },
}

pub struct HashTable {
    arena: Rc<Arena>,
    buckets: Vec<Cell<Bucket>>,
    min_array_capacity: usize,
}

const PAIR_SIZE: usize = size_of::<Pair>();

impl HashTable {
    /// `num_buckets` is the fixed bucket array size (spec: roughly the
    /// number of distinct keys expected). `min_array_capacity` is the
    /// smallest per-bucket overflow array, size class 0; it must be a
    /// power of two so every doubling remains a valid arena size
    /// class.
    pub fn new(arena: Rc<Arena>, num_buckets: usize, min_array_capacity: usize) -> Self {
        assert!(num_buckets > 0);
        assert!(min_array_capacity.is_power_of_two());
        HashTable {
            arena,
            buckets: (0..num_buckets).map(|_| Cell::new(Bucket::Empty)).collect(),
            min_array_capacity,
        }
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash as usize) % self.buckets.len()
    }

    fn read_pair(&self, offset: usize, index: usize) -> Pair {
        let bytes = self.arena.slice(offset + index * PAIR_SIZE, PAIR_SIZE);
        unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const Pair) }
    }

    fn write_pair(&self, offset: usize, index: usize, pair: Pair) {
        let bytes = self.arena.slice_mut(offset + index * PAIR_SIZE, PAIR_SIZE);
        unsafe { std::ptr::write_unaligned(bytes.as_mut_ptr() as *mut Pair, pair) };
    }

    pub fn add(&self, hash: u64, ptr: usize) -> DbResult<()> {
        let idx = self.bucket_index(hash);
        let incoming = Pair { hash, ptr };
        match self.buckets[idx].get() {
            Bucket::Empty => {
                self.buckets[idx].set(Bucket::Inline(incoming));
            }
            Bucket::Inline(existing) => {
                let capacity = self.min_array_capacity;
                let offset = self.arena.alloc(capacity * PAIR_SIZE)?;
                self.write_pair(offset, 0, existing);
                self.write_pair(offset, 1, incoming);
                self.buckets[idx].set(Bucket::Array { offset, capacity, count: 2 });
            }
            Bucket::Array { offset, capacity, count } if count < capacity => {
                self.write_pair(offset, count, incoming);
                self.buckets[idx].set(Bucket::Array { offset, capacity, count: count + 1 });
            }
            Bucket::Array { offset, capacity, count } => {
                let new_capacity = capacity * 2;
                let new_offset = self.arena.alloc(new_capacity * PAIR_SIZE)?;
                for i in 0..count {
                    let p = self.read_pair(offset, i);
                    self.write_pair(new_offset, i, p);
                }
                self.write_pair(new_offset, count, incoming);
                self.arena.free(offset, capacity * PAIR_SIZE);
                self.buckets[idx].set(Bucket::Array {
                    offset: new_offset,
                    capacity: new_capacity,
                    count: count + 1,
                });
            }
        }
        Ok(())
    }

    /// Removes the first pair equal to `(hash, ptr)`, returns whether
    /// one was found. Packing is preserved by swapping the removed
    /// slot with the last one; when count drops from 2 to 1 the array
    /// is freed and the remaining pair re-inlined.
    pub fn del(&self, hash: u64, ptr: usize) -> bool {
        let idx = self.bucket_index(hash);
        match self.buckets[idx].get() {
            Bucket::Empty => false,
            Bucket::Inline(p) if p.hash == hash && p.ptr == ptr => {
                self.buckets[idx].set(Bucket::Empty);
                true
            }
            Bucket::Inline(_) => false,
            Bucket::Array { offset, capacity, count } => {
                let found = (0..count).find(|&i| {
                    let p = self.read_pair(offset, i);
                    p.hash == hash && p.ptr == ptr
                });
                match found {
                    None => false,
                    Some(i) => {
                        let last = count - 1;
                        if i != last {
                            let moved = self.read_pair(offset, last);
                            self.write_pair(offset, i, moved);
                        }
                        if last == 1 {
                            let remaining = self.read_pair(offset, 0);
                            self.arena.free(offset, capacity * PAIR_SIZE);
                            self.buckets[idx].set(Bucket::Inline(remaining));
                        } else {
                            self.buckets[idx].set(Bucket::Array { offset, capacity, count: last });
                        }
                        true
                    }
                }
            }
        }
    }

    /// Scans the bucket for `hash`, writing up to `out.len()` matching
    /// pointers. Returns the count found when the bucket is exhausted,
    /// or the negation of the resume position when `out` fills up
    /// first; pass that (made positive) to `probe_contd` as `last`.
    pub fn probe(&self, hash: u64, out: &mut [usize]) -> isize {
        self.probe_from(hash, 0, out)
    }

    pub fn probe_contd(&self, hash: u64, last: usize, out: &mut [usize]) -> isize {
        self.probe_from(hash, last, out)
    }

    fn probe_from(&self, hash: u64, start: usize, out: &mut [usize]) -> isize {
        assert!(!out.is_empty(), "probe buffer must be non-empty");
        let idx = self.bucket_index(hash);
        match self.buckets[idx].get() {
            Bucket::Empty => 0,
            Bucket::Inline(p) => {
                if start > 0 {
                    return 0;
                }
                if p.hash == hash {
                    out[0] = p.ptr;
                    1
                } else {
                    0
                }
            }
            Bucket::Array { offset, count, .. } => {
                let cap = out.len();
                let mut pos = start;
                let mut n = 0usize;
                while pos < count {
                    let p = self.read_pair(offset, pos);
                    pos += 1;
                    if p.hash == hash {
                        out[n] = p.ptr;
                        n += 1;
                        if n == cap {
                            return -(pos as isize);
                        }
                    }
                }
                n as isize
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn drain_all(table: &HashTable, hash: u64) -> Vec<usize> {
        let mut out = [0usize; 2];
        let mut result = Vec::new();
        let mut n = table.probe(hash, &mut out);
        loop {
            if n >= 0 {
                result.extend_from_slice(&out[..n as usize]);
                break;
            }
            let last = (-n) as usize;
            result.extend_from_slice(&out);
            n = table.probe_contd(hash, last, &mut out);
        }
        result
    }

    #[test]
    fn add_then_probe_finds_exact_match() {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = HashTable::new(arena, 8, 4);
        t.add(10, 111).unwrap();
        assert_eq!(drain_all(&t, 10), vec![111]);
        assert_eq!(drain_all(&t, 11), Vec::<usize>::new());
    }

    #[test]
    fn grows_past_inline_and_array_capacity() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let t = HashTable::new(arena, 4, 2);
        for i in 0..20 {
            t.add(3, 1000 + i).unwrap();
        }
        let mut found: Vec<usize> = drain_all(&t, 3);
        found.sort_unstable();
        let mut expected: Vec<usize> = (0..20).map(|i| 1000 + i).collect();
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn delete_then_probe_excludes_entry() {
        let arena = Rc::new(Arena::new(1 << 16, 8));
        let t = HashTable::new(arena, 8, 2);
        t.add(5, 1).unwrap();
        t.add(5, 2).unwrap();
        t.add(5, 3).unwrap();
        assert!(t.del(5, 2));
        let mut found = drain_all(&t, 5);
        found.sort_unstable();
        assert_eq!(found, vec![1, 3]);
        assert!(!t.del(5, 2));
    }

    #[test]
    fn probe_union_matches_add_minus_delete_multiset() {
        let arena = Rc::new(Arena::new(1 << 20, 8));
        let t = HashTable::new(arena, 16, 2);
        let mut expected: HashMap<u64, Vec<usize>> = HashMap::new();
        for i in 0..200usize {
            let hash = (i % 7) as u64;
            t.add(hash, i).unwrap();
            expected.entry(hash).or_default().push(i);
        }
        for i in (0..200usize).step_by(3) {
            let hash = (i % 7) as u64;
            t.del(hash, i);
            let v = expected.get_mut(&hash).unwrap();
            if let Some(pos) = v.iter().position(|&x| x == i) {
                v.remove(pos);
            }
        }
        for hash in 0..7u64 {
            let mut got = drain_all(&t, hash);
            got.sort_unstable();
            let mut want = expected.remove(&hash).unwrap_or_default();
            want.sort_unstable();
            assert_eq!(got, want, "hash {hash}");
        }
    }
}
