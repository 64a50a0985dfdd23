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

use ddsketch::DenseStore;
use ddsketch::error::ErrorKind;

#[test]
fn test_empty() {
    let store = DenseStore::new();
    assert!(store.is_empty());
    assert_eq!(store.count(), 0.0);
    assert_eq!(store.num_bins(), 0);
    assert_eq!(store.min_key(), i32::MAX);
    assert_eq!(store.max_key(), i32::MIN);
    assert_eq!(store.iter().count(), 0);
}

#[test]
fn test_iteration_is_key_ascending_and_skips_empty_bins() {
    let mut store = DenseStore::new();
    store.add(7, 2.0);
    store.add(-3, 1.0);
    store.add(0, 4.0);
    store.add(7, 1.0);

    let collected: Vec<_> = store.iter().collect();
    assert_eq!(collected, vec![(-3, 1.0), (0, 4.0), (7, 3.0)]);
    assert_eq!(store.count(), 8.0);

    // Iteration is restartable.
    let again: Vec<_> = store.iter().collect();
    assert_eq!(again, collected);
}

#[test]
fn test_key_at_rank_lower_and_upper() {
    let mut store = DenseStore::new();
    store.add(1, 2.0);
    store.add(2, 1.0);
    store.add(5, 3.0);

    // Cumulative weights: key 1 -> 2, key 2 -> 3, key 5 -> 6.
    assert_eq!(store.key_at_rank(0.0, true), 1);
    assert_eq!(store.key_at_rank(1.5, true), 1);
    assert_eq!(store.key_at_rank(2.0, true), 2);
    assert_eq!(store.key_at_rank(3.0, true), 5);
    assert_eq!(store.key_at_rank(5.5, true), 5);

    // Upper-bound mode reaches a key once its cumulative weight is rank + 1.
    assert_eq!(store.key_at_rank(1.0, false), 1);
    assert_eq!(store.key_at_rank(1.5, false), 2);
    assert_eq!(store.key_at_rank(2.0, false), 2);
    assert_eq!(store.key_at_rank(5.0, false), 5);
}

#[test]
fn test_key_at_rank_clamps_negative_ranks() {
    let mut store = DenseStore::new();
    store.add(4, 1.0);
    assert_eq!(store.key_at_rank(-3.0, true), 4);
}

#[test]
fn test_key_at_rank_beyond_total_weight_returns_max_key() {
    let mut store = DenseStore::new();
    store.add(1, 1.0);
    store.add(9, 1.0);
    assert_eq!(store.key_at_rank(2.0, true), 9);
    assert_eq!(store.key_at_rank(100.0, true), 9);
    assert_eq!(store.key_at_rank(100.0, false), 9);
}

#[test]
fn test_merge_with_empty_is_noop() {
    let mut store = DenseStore::new();
    store.add(3, 2.0);
    let before = store.clone();
    store.merge(&DenseStore::new());
    assert_eq!(store, before);
}

#[test]
fn test_merge_into_empty_deep_copies() {
    let mut other = DenseStore::new();
    other.add(3, 2.0);
    other.add(-5, 1.0);

    let mut store = DenseStore::new();
    store.merge(&other);
    assert_eq!(store.count(), 3.0);
    let collected: Vec<_> = store.iter().collect();
    assert_eq!(collected, vec![(-5, 1.0), (3, 2.0)]);

    // Deep copy: mutating the source afterwards does not affect the merge.
    other.add(3, 10.0);
    assert_eq!(store.count(), 3.0);
}

#[test]
fn test_merge_overlapping_and_disjoint_ranges() {
    let mut left = DenseStore::new();
    left.add(0, 1.0);
    left.add(1, 1.0);

    let mut overlapping = DenseStore::new();
    overlapping.add(1, 2.0);
    overlapping.add(2, 2.0);

    left.merge(&overlapping);
    assert_eq!(left.count(), 6.0);
    let collected: Vec<_> = left.iter().collect();
    assert_eq!(collected, vec![(0, 1.0), (1, 3.0), (2, 2.0)]);

    // A store whose range is far away forces a range extension.
    let mut disjoint = DenseStore::new();
    disjoint.add(1000, 5.0);
    left.merge(&disjoint);
    assert_eq!(left.count(), 11.0);
    assert_eq!(left.min_key(), 0);
    assert_eq!(left.max_key(), 1000);
    let collected: Vec<_> = left.iter().collect();
    assert_eq!(collected, vec![(0, 1.0), (1, 3.0), (2, 2.0), (1000, 5.0)]);
}

#[test]
fn test_reweigh_scales_counts() {
    let mut store = DenseStore::new();
    store.add(1, 2.0);
    store.add(3, 4.0);

    store.reweigh(0.5).unwrap();
    assert_eq!(store.count(), 3.0);
    let collected: Vec<_> = store.iter().collect();
    assert_eq!(collected, vec![(1, 1.0), (3, 2.0)]);
}

#[test]
fn test_reweigh_by_one_is_noop() {
    let mut store = DenseStore::new();
    store.add(1, 2.0);
    let before = store.clone();
    store.reweigh(1.0).unwrap();
    assert_eq!(store, before);
}

#[test]
fn test_reweigh_non_positive_factor_fails_without_mutation() {
    let mut store = DenseStore::new();
    store.add(1, 2.0);
    let before = store.clone();

    for factor in [0.0, -1.0] {
        let err = store.reweigh(factor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store, before);
    }
}

#[test]
fn test_reweigh_empty_store() {
    let mut store = DenseStore::new();
    store.reweigh(2.0).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_copy_from() {
    let mut source = DenseStore::new();
    source.add(2, 3.0);

    let mut store = DenseStore::new();
    store.add(-100, 1.0);
    store.copy_from(&source);
    assert_eq!(store, source);

    source.add(2, 1.0);
    assert_eq!(store.count(), 3.0);
}

#[test]
fn test_serialize_round_trip_is_behaviorally_equivalent() {
    let mut store = DenseStore::new();
    for key in [-40, -1, 0, 3, 90] {
        store.add(key, (key.unsigned_abs() + 1) as f64);
    }

    let bytes = store.serialize();
    assert_eq!(bytes.len(), store.serialized_size_bytes());

    let decoded = DenseStore::deserialize(&bytes).unwrap();
    assert_eq!(decoded.count(), store.count());
    assert_eq!(decoded.min_key(), store.min_key());
    assert_eq!(decoded.max_key(), store.max_key());
    let left: Vec<_> = store.iter().collect();
    let right: Vec<_> = decoded.iter().collect();
    assert_eq!(left, right);
    for rank in [0.0, 1.0, 50.5, 1000.0] {
        assert_eq!(decoded.key_at_rank(rank, true), store.key_at_rank(rank, true));
        assert_eq!(
            decoded.key_at_rank(rank, false),
            store.key_at_rank(rank, false)
        );
    }
}

#[test]
fn test_serialize_empty_round_trip() {
    let store = DenseStore::new();
    let bytes = store.serialize();
    assert_eq!(bytes.len(), 8);
    let decoded = DenseStore::deserialize(&bytes).unwrap();
    assert!(decoded.is_empty());
    assert_eq!(decoded.iter().count(), 0);
}

#[test]
fn test_deserialize_replay_drops_zero_boundary_bins() {
    // offset 10, four physical bins with zeros at both ends: the replayed
    // adds skip the zero bins, so the rebuilt logical range is [11, 12]
    // rather than the serialized buffer's [10, 13].
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&10i32.to_be_bytes());
    bytes.extend_from_slice(&4u32.to_be_bytes());
    for bin in [0.0f64, 2.0, 3.0, 0.0] {
        bytes.extend_from_slice(&bin.to_be_bytes());
    }

    let decoded = DenseStore::deserialize(&bytes).unwrap();
    assert_eq!(decoded.min_key(), 11);
    assert_eq!(decoded.max_key(), 12);
    assert_eq!(decoded.count(), 5.0);
    let collected: Vec<_> = decoded.iter().collect();
    assert_eq!(collected, vec![(11, 2.0), (12, 3.0)]);
}

#[test]
fn test_deserialize_truncated_buffer_fails() {
    let mut store = DenseStore::new();
    store.add(0, 1.0);
    let bytes = store.serialize();

    for len in [0, 3, 4, 7, 8, bytes.len() - 1] {
        let err = DenseStore::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    }
}
