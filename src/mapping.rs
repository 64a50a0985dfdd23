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

// Smallest magnitude the mapping distinguishes from zero, before scaling by
// gamma: half the smallest positive normal double.
const MIN_SAFE_FLOAT_EXP: i32 = -1023;

/// Maps a positive value to an integer bucket key and back.
///
/// Bucket boundaries form a geometric sequence with common ratio `gamma`, so
/// the representative value of any bucket differs from every value in that
/// bucket by at most the configured relative accuracy.
///
/// Implementations are immutable after construction.
pub trait IndexMapping {
    /// Returns the configured relative accuracy, in `(0, 1)`.
    fn relative_accuracy(&self) -> f64;

    /// Returns the per-bucket growth ratio, `1 + 2a / (1 - a)`.
    fn gamma(&self) -> f64;

    /// Returns the key shift applied after bucketing.
    fn index_offset(&self) -> f64;

    /// Returns the smallest magnitude this mapping can bucket; values at or
    /// below it belong in the sketch's zero bucket.
    fn min_possible(&self) -> f64;

    /// Returns the largest magnitude this mapping can bucket.
    fn max_possible(&self) -> f64;

    /// Returns the logarithm of `value` in base `gamma`.
    fn log_gamma(&self, value: f64) -> f64;

    /// Returns `gamma` raised to `value`.
    fn pow_gamma(&self, value: f64) -> f64;

    /// Returns the bucket key for a value.
    ///
    /// Defined only for `value > 0`; callers route zero-magnitude values to
    /// the sketch's zero bucket instead.
    fn key(&self, value: f64) -> i32 {
        (self.log_gamma(value).ceil() + self.index_offset()) as i32
    }

    /// Returns the representative value of a bucket, the geometric mid-point
    /// chosen so the worst-case relative error stays within
    /// [`relative_accuracy`](Self::relative_accuracy).
    fn value(&self, key: i32) -> f64 {
        self.pow_gamma(key as f64 - self.index_offset()) * (2.0 / (1.0 + self.gamma()))
    }
}

/// Index mapping based on a base-2 logarithm rescaled to base `gamma`.
///
/// This is the only production mapping; the [`IndexMapping`] trait leaves
/// room for other bucketing strategies without touching the store or sketch.
#[derive(Debug, Clone, PartialEq)]
pub struct LogarithmicMapping {
    relative_accuracy: f64,
    gamma: f64,
    multiplier: f64,
    offset: f64,
    min_possible: f64,
    max_possible: f64,
}

impl LogarithmicMapping {
    /// Creates a mapping with the given relative accuracy and no key shift.
    ///
    /// Fails with an `InvalidArgument` error if `relative_accuracy` is not in
    /// `(0, 1)`.
    pub fn new(relative_accuracy: f64) -> Result<Self, Error> {
        Self::with_offset(relative_accuracy, 0.0)
    }

    /// Creates a mapping with the given relative accuracy and key shift.
    ///
    /// Fails with an `InvalidArgument` error if `relative_accuracy` is not in
    /// `(0, 1)`.
    pub fn with_offset(relative_accuracy: f64, offset: f64) -> Result<Self, Error> {
        if !(relative_accuracy > 0.0 && relative_accuracy < 1.0) {
            return Err(Error::invalid_argument(
                "relative accuracy must be between 0 and 1",
            )
            .with_context("relative_accuracy", relative_accuracy));
        }

        let mantissa = (2.0 * relative_accuracy) / (1.0 - relative_accuracy);
        let gamma = 1.0 + mantissa;
        // Pre-scaled by ln 2 so log_gamma can use log2 directly.
        let multiplier = std::f64::consts::LN_2 / mantissa.ln_1p();
        let min_safe_float = 2.0f64.powi(MIN_SAFE_FLOAT_EXP);

        Ok(Self {
            relative_accuracy,
            gamma,
            multiplier,
            offset,
            min_possible: min_safe_float * gamma,
            max_possible: f64::MAX / gamma,
        })
    }

    /// Reconstructs a mapping equivalent to one that reported the given
    /// `gamma` and key shift, via `relative_accuracy = (gamma-1)/(gamma+1)`.
    pub fn from_gamma_offset(gamma: f64, offset: f64) -> Result<Self, Error> {
        let relative_accuracy = (gamma - 1.0) / (gamma + 1.0);
        Self::with_offset(relative_accuracy, offset)
    }
}

impl IndexMapping for LogarithmicMapping {
    fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn index_offset(&self) -> f64 {
        self.offset
    }

    fn min_possible(&self) -> f64 {
        self.min_possible
    }

    fn max_possible(&self) -> f64 {
        self.max_possible
    }

    fn log_gamma(&self, value: f64) -> f64 {
        value.log2() * self.multiplier
    }

    fn pow_gamma(&self, value: f64) -> f64 {
        (value / self.multiplier).exp2()
    }
}
