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
use crate::mapping::IndexMapping;
use crate::mapping::LogarithmicMapping;
use crate::store::DenseStore;
use crate::store::DenseStoreIter;

/// The relative accuracy used by [`DDSketch::new`] callers that do not need
/// a specific guarantee.
pub const DEFAULT_RELATIVE_ACCURACY: f64 = 0.01;

/// DDSketch for estimating quantiles with a relative error guarantee.
///
/// The sketch composes an [`IndexMapping`], two [`DenseStore`]s holding the
/// positive and negative magnitudes, and a scalar zero-bucket count, so it
/// represents a full signed distribution without retaining samples.
///
/// See the [crate level documentation](crate) for more.
#[derive(Debug, Clone, PartialEq)]
pub struct DDSketch<M: IndexMapping = LogarithmicMapping> {
    mapping: M,
    positives: DenseStore,
    negatives: DenseStore,
    zero_count: f64,
}

impl DDSketch<LogarithmicMapping> {
    /// Creates an empty sketch with the given relative accuracy, using the
    /// logarithmic mapping.
    ///
    /// Fails with an `InvalidArgument` error if `relative_accuracy` is not in
    /// `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ddsketch::DDSketch;
    /// let mut sketch = DDSketch::new(0.01)?;
    /// sketch.add(42.0)?;
    /// assert_eq!(sketch.count(), 1.0);
    /// # Ok::<(), ddsketch::error::Error>(())
    /// ```
    pub fn new(relative_accuracy: f64) -> Result<Self, Error> {
        Ok(Self::with_mapping(LogarithmicMapping::new(
            relative_accuracy,
        )?))
    }
}

impl<M: IndexMapping> DDSketch<M> {
    /// Creates an empty sketch over the given mapping.
    pub fn with_mapping(mapping: M) -> Self {
        Self {
            mapping,
            positives: DenseStore::new(),
            negatives: DenseStore::new(),
            zero_count: 0.0,
        }
    }

    pub(crate) fn from_parts(
        mapping: M,
        positives: DenseStore,
        negatives: DenseStore,
        zero_count: f64,
    ) -> Self {
        Self {
            mapping,
            positives,
            negatives,
            zero_count,
        }
    }

    /// Returns the mapping this sketch buckets values with.
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    pub(crate) fn positives(&self) -> &DenseStore {
        &self.positives
    }

    pub(crate) fn negatives(&self) -> &DenseStore {
        &self.negatives
    }

    pub(crate) fn zero_count(&self) -> f64 {
        self.zero_count
    }

    /// Records a value with unit weight.
    ///
    /// See [`add_with_count`](Self::add_with_count).
    pub fn add(&mut self, value: f64) -> Result<(), Error> {
        self.add_with_count(value, 1.0)
    }

    /// Records a value with the given weight.
    ///
    /// Fails with an `InvalidArgument` error if `count` is negative, leaving
    /// the sketch unchanged. Values whose magnitude is too small for the
    /// mapping to bucket go to the zero bucket.
    pub fn add_with_count(&mut self, value: f64, count: f64) -> Result<(), Error> {
        if count < 0.0 {
            return Err(
                Error::invalid_argument("cannot add a negative count").with_context("count", count)
            );
        }
        if value > self.mapping.min_possible() {
            self.positives.add(self.mapping.key(value), count);
        } else if value < -self.mapping.min_possible() {
            self.negatives.add(self.mapping.key(-value), count);
        } else {
            self.zero_count += count;
        }
        Ok(())
    }

    /// Returns the total weight recorded in the sketch.
    pub fn count(&self) -> f64 {
        self.zero_count + self.positives.count() + self.negatives.count()
    }

    /// Returns true if no weight has been recorded.
    pub fn is_empty(&self) -> bool {
        self.count() == 0.0
    }

    /// Returns the approximate sum of recorded values, computed from bucket
    /// representative values rather than exact samples.
    pub fn sum(&self) -> f64 {
        let mut sum = 0.0;
        for (value, count) in self.iter() {
            sum += value * count;
        }
        sum
    }

    /// Returns the approximate maximum recorded value, or NaN if the sketch
    /// is empty.
    ///
    /// This is the representative value of the highest occupied bucket, not
    /// the exact extreme; callers needing exact extrema track them alongside
    /// the sketch.
    pub fn max(&self) -> f64 {
        if !self.positives.is_empty() {
            return self.mapping.value(self.positives.max_key());
        }
        if self.zero_count > 0.0 {
            return 0.0;
        }
        if !self.negatives.is_empty() {
            return -self.mapping.value(self.negatives.min_key());
        }
        f64::NAN
    }

    /// Returns the approximate minimum recorded value, or NaN if the sketch
    /// is empty. Mirror rule of [`max`](Self::max).
    pub fn min(&self) -> f64 {
        if !self.negatives.is_empty() {
            return -self.mapping.value(self.negatives.max_key());
        }
        if self.zero_count > 0.0 {
            return 0.0;
        }
        if !self.positives.is_empty() {
            return self.mapping.value(self.positives.min_key());
        }
        f64::NAN
    }

    /// Discards all recorded weight, keeping the mapping.
    pub fn clear(&mut self) {
        self.positives.clear();
        self.negatives.clear();
        self.zero_count = 0.0;
    }

    /// Merges another sketch into this one.
    ///
    /// Fails with an `InvalidArgument` error if the sketches were built with
    /// different `gamma` values; summaries at different accuracies have
    /// incompatible bucket boundaries. The check precedes any mutation.
    pub fn merge(&mut self, other: &DDSketch<M>) -> Result<(), Error> {
        if self.mapping.gamma() != other.mapping.gamma() {
            return Err(
                Error::invalid_argument("cannot merge sketches with different gamma values")
                    .with_context("gamma", self.mapping.gamma())
                    .with_context("other_gamma", other.mapping.gamma()),
            );
        }
        self.positives.merge(&other.positives);
        self.negatives.merge(&other.negatives);
        self.zero_count += other.zero_count;
        Ok(())
    }

    /// Replaces this sketch's contents with a deep copy of `other`.
    ///
    /// Mappings are immutable after construction, so cloning one is
    /// equivalent to sharing it.
    pub fn copy_from(&mut self, other: &DDSketch<M>)
    where
        M: Clone,
    {
        self.mapping = other.mapping.clone();
        self.positives.copy_from(&other.positives);
        self.negatives.copy_from(&other.negatives);
        self.zero_count = other.zero_count;
    }

    /// Returns the approximate value at the given quantile, using the
    /// sketch's own total count.
    ///
    /// See [`value_at_quantile_with_count`](Self::value_at_quantile_with_count).
    pub fn value_at_quantile(&self, quantile: f64) -> f64 {
        self.value_at_quantile_with_count(quantile, self.count())
    }

    /// Returns the approximate value at the given quantile, ranking against
    /// the supplied total count.
    ///
    /// Returns NaN if `quantile` is outside `[0, 1]` or `count` is zero. The
    /// explicit count exists for callers that merge persisted sketches while
    /// tracking an authoritative total separately from the sketch's own
    /// derived tally.
    pub fn value_at_quantile_with_count(&self, quantile: f64, count: f64) -> f64 {
        if !(0.0..=1.0).contains(&quantile) || count == 0.0 {
            return f64::NAN;
        }

        // Direct nearest-rank index, not interpolated between ranks.
        let rank = quantile * (count - 1.0);

        if rank < self.negatives.count() {
            let reversed_rank = self.negatives.count() - rank - 1.0;
            let key = self.negatives.key_at_rank(reversed_rank, false);
            -self.mapping.value(key)
        } else if rank < self.zero_count + self.negatives.count() {
            0.0
        } else {
            let key = self
                .positives
                .key_at_rank(rank - self.zero_count - self.negatives.count(), true);
            self.mapping.value(key)
        }
    }

    /// Returns an iterator over `(value, count)` pairs: the zero bucket
    /// first (if occupied), then positive buckets in increasing key order,
    /// then negative buckets in increasing key order as negated values.
    ///
    /// This traversal is not a global ascending ordering of values; the
    /// order is part of the sketch's observable behavior.
    pub fn iter(&self) -> DDSketchIter<'_, M> {
        DDSketchIter {
            mapping: &self.mapping,
            positives: self.positives.iter(),
            negatives: self.negatives.iter(),
            zero_count: self.zero_count,
            state: IterState::Zero,
        }
    }
}

enum IterState {
    Zero,
    Positives,
    Negatives,
}

/// Iterator over the occupied `(value, count)` buckets of a [`DDSketch`].
pub struct DDSketchIter<'a, M: IndexMapping> {
    mapping: &'a M,
    positives: DenseStoreIter<'a>,
    negatives: DenseStoreIter<'a>,
    zero_count: f64,
    state: IterState,
}

impl<M: IndexMapping> Iterator for DDSketchIter<'_, M> {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if let IterState::Zero = self.state {
            self.state = IterState::Positives;
            if self.zero_count != 0.0 {
                return Some((0.0, self.zero_count));
            }
        }
        if let IterState::Positives = self.state {
            if let Some((key, count)) = self.positives.next() {
                return Some((self.mapping.value(key), count));
            }
            self.state = IterState::Negatives;
        }
        self.negatives
            .next()
            .map(|(key, count)| (-self.mapping.value(key), count))
    }
}

impl<'a, M: IndexMapping> IntoIterator for &'a DDSketch<M> {
    type Item = (f64, f64);
    type IntoIter = DDSketchIter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
