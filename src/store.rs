// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::error::Error;

/// Physical bin storage grows in multiples of this many bins.
const CHUNK_SIZE: i32 = 128;

/// An array-backed histogram over a contiguous range of bucket keys.
///
/// The store owns a growable buffer of 64-bit counts indexed by
/// `key - offset` and tracks the logical occupied range `[min_key, max_key]`
/// separately from the physical buffer. Insertion is amortized O(1): ranges
/// that still fit the allocated buffer only move the logical bounds, and a
/// range that outgrows the buffer triggers a copying shift that re-centers
/// the occupied span in the (possibly enlarged) buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseStore {
    bins: Vec<f64>,
    count: f64,
    offset: i32,
    min_key: i32,
    max_key: i32,
}

impl Default for DenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DenseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            bins: Vec::new(),
            count: 0.0,
            offset: 0,
            min_key: i32::MAX,
            max_key: i32::MIN,
        }
    }

    /// Returns the total weight recorded in the store.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Returns true if no weight has been recorded.
    pub fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    /// Returns the bucket key represented by the first physical bin.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Returns the smallest key with recorded weight, or `i32::MAX` when the
    /// store is empty.
    pub fn min_key(&self) -> i32 {
        self.min_key
    }

    /// Returns the largest key with recorded weight, or `i32::MIN` when the
    /// store is empty.
    pub fn max_key(&self) -> i32 {
        self.max_key
    }

    /// Returns the physical buffer length in bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    pub(crate) fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Adds `count` weight at the given bucket key, extending the key range
    /// if needed. Adding zero weight is a no-op.
    pub fn add(&mut self, key: i32, count: f64) {
        if count == 0.0 {
            return;
        }
        let index = self.normalize(key);
        self.bins[index] += count;
        self.count += count;
    }

    /// Returns the key at the given zero-based rank in the weighted,
    /// key-ascending ordering of recorded weight.
    ///
    /// With `lower` set, returns the first key whose cumulative weight
    /// exceeds `rank`; otherwise the first key whose cumulative weight
    /// reaches `rank + 1`, which mirrors negative-side ranks onto an
    /// upper-bound selection. If accumulated rounding exhausts the scan,
    /// returns [`max_key`](Self::max_key) rather than failing.
    pub fn key_at_rank(&self, rank: f64, lower: bool) -> i32 {
        let rank = rank.max(0.0);

        let mut n = 0.0;
        for (i, b) in self.bins.iter().enumerate() {
            n += b;
            if (lower && n > rank) || (!lower && n >= rank + 1.0) {
                return i as i32 + self.offset;
            }
        }

        self.max_key
    }

    /// Adds every bin of `other` into this store.
    ///
    /// A merge with an empty store is a no-op; merging into an empty store
    /// deep-copies `other`.
    pub fn merge(&mut self, other: &DenseStore) {
        if other.is_empty() {
            return;
        }

        if self.is_empty() {
            self.copy_from(other);
            return;
        }

        if other.min_key < self.min_key || other.max_key > self.max_key {
            self.extend_range(other.min_key, other.max_key);
        }

        for key in other.min_key..=other.max_key {
            self.bins[(key - self.offset) as usize] += other.bins[(key - other.offset) as usize];
        }

        self.count += other.count;
    }

    /// Multiplies every occupied bin and the total count by `w`.
    ///
    /// Fails with an `InvalidArgument` error if `w <= 0`, leaving the store
    /// unchanged; reweighing by exactly 1 is a no-op.
    pub fn reweigh(&mut self, w: f64) -> Result<(), Error> {
        if w <= 0.0 {
            return Err(
                Error::invalid_argument("reweigh factor must be positive").with_context("factor", w)
            );
        }
        if w == 1.0 {
            return Ok(());
        }
        self.count *= w;
        for key in self.min_key..=self.max_key {
            self.bins[(key - self.offset) as usize] *= w;
        }
        Ok(())
    }

    /// Replaces this store's contents with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &DenseStore) {
        self.bins = other.bins.clone();
        self.count = other.count;
        self.offset = other.offset;
        self.min_key = other.min_key;
        self.max_key = other.max_key;
    }

    /// Resets the store to the empty state, releasing the bin buffer.
    pub fn clear(&mut self) {
        self.bins = Vec::new();
        self.count = 0.0;
        self.min_key = i32::MAX;
        self.max_key = i32::MIN;
    }

    /// Returns an iterator over `(key, count)` pairs for every key in
    /// `[min_key, max_key]` with positive count, in increasing key order.
    pub fn iter(&self) -> DenseStoreIter<'_> {
        DenseStoreIter {
            store: self,
            key: self.min_key as i64,
        }
    }

    /// Maps a key to a physical bin index, extending the range first when the
    /// key falls outside the current logical bounds.
    fn normalize(&mut self, key: i32) -> usize {
        if key < self.min_key || key > self.max_key {
            self.extend_range(key, key);
        }
        (key - self.offset) as usize
    }

    /// Smallest multiple of [`CHUNK_SIZE`] covering the given span.
    fn new_length(new_min_key: i32, new_max_key: i32) -> usize {
        let desired = new_max_key - new_min_key + 1;
        (CHUNK_SIZE * ((desired + CHUNK_SIZE - 1) / CHUNK_SIZE)) as usize
    }

    /// Extends the logical range to cover `[new_min_key, new_max_key]`,
    /// growing and re-centering the physical buffer when it no longer fits.
    fn extend_range(&mut self, new_min_key: i32, new_max_key: i32) {
        let new_min_key = new_min_key.min(self.min_key);
        let new_max_key = new_max_key.max(self.max_key);

        if self.is_empty() {
            let initial_length = Self::new_length(new_min_key, new_max_key);
            self.bins = vec![0.0; initial_length];
            self.offset = new_min_key;
            self.adjust(new_min_key, new_max_key);
        } else if new_min_key >= self.min_key
            && (new_max_key as i64) < self.offset as i64 + self.bins.len() as i64
        {
            // The allocated buffer still covers the new range; moving only
            // the logical bounds absorbs monotonically growing ranges
            // without any data movement.
            self.min_key = new_min_key;
            self.max_key = new_max_key;
        } else {
            let new_length = Self::new_length(new_min_key, new_max_key);
            if new_length > self.bins.len() {
                self.bins.resize(new_length, 0.0);
            }
            self.adjust(new_min_key, new_max_key);
        }
    }

    /// Re-centers the occupied span: places the midpoint of
    /// `[new_min_key, new_max_key]` at the midpoint of the buffer.
    fn adjust(&mut self, new_min_key: i32, new_max_key: i32) {
        let mid_index = new_min_key + (new_max_key - new_min_key + 1) / 2;
        self.shift_bins(self.offset + self.bins.len() as i32 / 2 - mid_index);
        self.min_key = new_min_key;
        self.max_key = new_max_key;
    }

    /// Moves every bin value `shift` slots towards higher indices (negative
    /// shifts move towards lower indices), zero-filling vacated slots.
    /// Always copies into a fresh buffer, never aliasing the live ranges.
    fn shift_bins(&mut self, shift: i32) {
        if shift == 0 {
            return;
        }

        let len = self.bins.len();
        let mut new_bins = vec![0.0; len];
        let magnitude = shift.unsigned_abs() as usize;

        if magnitude < len {
            if shift > 0 {
                new_bins[magnitude..].copy_from_slice(&self.bins[..len - magnitude]);
            } else {
                new_bins[..len - magnitude].copy_from_slice(&self.bins[magnitude..]);
            }
        }

        self.bins = new_bins;
        self.offset -= shift;
    }
}

/// Iterator over the occupied `(key, count)` pairs of a [`DenseStore`].
pub struct DenseStoreIter<'a> {
    store: &'a DenseStore,
    key: i64,
}

impl Iterator for DenseStoreIter<'_> {
    type Item = (i32, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.key <= self.store.max_key as i64 {
            let key = self.key as i32;
            self.key += 1;
            let count = self.store.bins[(key - self.store.offset) as usize];
            if count > 0.0 {
                return Some((key, count));
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a DenseStore {
    type Item = (i32, f64);
    type IntoIter = DenseStoreIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_add_centers_the_key() {
        let mut store = DenseStore::new();
        store.add(0, 1.0);
        assert_eq!(store.num_bins(), CHUNK_SIZE as usize);
        assert_eq!(store.min_key(), 0);
        assert_eq!(store.max_key(), 0);
        // Key 0 lands in the middle of the fresh buffer.
        assert_eq!(store.offset(), -(CHUNK_SIZE / 2));
    }

    #[test]
    fn test_growth_within_buffer_keeps_offset() {
        let mut store = DenseStore::new();
        store.add(10, 1.0);
        let offset = store.offset();
        store.add(20, 1.0);
        store.add(40, 1.0);
        // Still inside the allocated chunk, so no shift happened.
        assert_eq!(store.offset(), offset);
        assert_eq!(store.num_bins(), CHUNK_SIZE as usize);
        assert_eq!(store.min_key(), 10);
        assert_eq!(store.max_key(), 40);
    }

    #[test]
    fn test_growth_beyond_buffer_recenters() {
        let mut store = DenseStore::new();
        store.add(0, 1.0);
        store.add(500, 2.0);
        assert_eq!(store.num_bins(), 512);
        assert_eq!(store.min_key(), 0);
        assert_eq!(store.max_key(), 500);
        let collected: Vec<_> = store.iter().collect();
        assert_eq!(collected, vec![(0, 1.0), (500, 2.0)]);
    }

    #[test]
    fn test_shift_preserves_values() {
        let mut store = DenseStore::new();
        for key in [3, -7, 250, -250] {
            store.add(key, 1.0);
        }
        let mut collected: Vec<_> = store.iter().map(|(k, _)| k).collect();
        collected.sort_unstable();
        assert_eq!(collected, vec![-250, -7, 3, 250]);
        assert_eq!(store.count(), 4.0);
    }

    #[test]
    fn test_add_zero_count_is_noop() {
        let mut store = DenseStore::new();
        store.add(5, 0.0);
        assert!(store.is_empty());
        assert_eq!(store.num_bins(), 0);
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let mut store = DenseStore::new();
        store.add(1, 1.0);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.num_bins(), 0);
        assert_eq!(store.min_key(), i32::MAX);
        assert_eq!(store.max_key(), i32::MIN);
        assert_eq!(store.iter().count(), 0);
    }
}
