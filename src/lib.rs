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

//! A mergeable quantile sketch with relative-error guarantees.
//!
//! [`DDSketch`] consumes a stream of real-valued samples one at a time and
//! maintains a compact summary that answers "what value is at quantile q"
//! within a configured relative accuracy, without retaining the samples.
//! Summaries built independently over disjoint sub-streams can be merged,
//! and a summary serializes to a compact binary blob that deserializes to
//! an observably equivalent sketch.
//!
//! Values are bucketed by a logarithmic [`IndexMapping`], so bucket
//! boundaries form a geometric sequence and the representative value of any
//! bucket is within the relative accuracy of every value it holds. Bucket
//! counts live in two [`DenseStore`]s (positive and negative magnitudes)
//! plus a scalar zero-bucket count.
//!
//! The sketch is single-threaded and fully synchronous; sharing one across
//! threads requires external exclusion by the caller.
//!
//! # References
//!
//! - Charles Masson, Jee E. Rim, Homin K. Lee,
//!   "DDSketch: A Fast and Fully-Mergeable Quantile Sketch with
//!   Relative-Error Guarantees", VLDB 2019.
//!
//! # Usage
//!
//! ```rust
//! use ddsketch::DDSketch;
//!
//! let mut sketch = DDSketch::new(0.01)?;
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     sketch.add(value)?;
//! }
//!
//! let median = sketch.value_at_quantile(0.5);
//! assert!((median - 3.0).abs() / 3.0 <= 0.01);
//!
//! let blob = sketch.serialize();
//! let restored = DDSketch::deserialize(&blob)?;
//! assert_eq!(restored.count(), sketch.count());
//! # Ok::<(), ddsketch::error::Error>(())
//! ```

pub mod error;

mod codec;
mod mapping;
mod serialization;
mod sketch;
mod store;

pub use self::mapping::IndexMapping;
pub use self::mapping::LogarithmicMapping;
pub use self::serialization::MAPPING_SIZE_BYTES;
pub use self::sketch::DDSketch;
pub use self::sketch::DDSketchIter;
pub use self::sketch::DEFAULT_RELATIVE_ACCURACY;
pub use self::store::DenseStore;
pub use self::store::DenseStoreIter;
