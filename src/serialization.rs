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

//! Binary serialization for the mapping, store, and sketch.
//!
//! Layout, with every multi-byte field big-endian:
//!
//! - mapping: `gamma` f64, `offset` f64 (16 bytes)
//! - store: `offset` i32, `num_bins` u32, then `num_bins` f64 bin counts
//!   (`num_bins` is the physical buffer length, not the occupied bin count)
//! - sketch: mapping, positive store, negative store, `zero_count` f64
//!
//! A sketch is decoded by consuming one cursor in that fixed order, each
//! component reading exactly its own length.

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::mapping::IndexMapping;
use crate::mapping::LogarithmicMapping;
use crate::sketch::DDSketch;
use crate::store::DenseStore;

/// Serialized size of an index mapping in bytes.
pub const MAPPING_SIZE_BYTES: usize = 16;

impl LogarithmicMapping {
    /// Serializes the mapping to its 16-byte representation.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(MAPPING_SIZE_BYTES);
        write_mapping(self, &mut bytes);
        bytes.into_bytes()
    }

    /// Deserializes a mapping from its 16-byte representation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        read_mapping(&mut SketchSlice::new(bytes))
    }
}

fn write_mapping<M: IndexMapping>(mapping: &M, bytes: &mut SketchBytes) {
    bytes.write_f64_be(mapping.gamma());
    bytes.write_f64_be(mapping.index_offset());
}

fn read_mapping(input: &mut SketchSlice<'_>) -> Result<LogarithmicMapping, Error> {
    let gamma = input
        .read_f64_be()
        .map_err(|_| Error::insufficient_data("gamma"))?;
    let offset = input
        .read_f64_be()
        .map_err(|_| Error::insufficient_data("mapping_offset"))?;
    LogarithmicMapping::from_gamma_offset(gamma, offset)
}

impl DenseStore {
    /// Returns the size of this store's serialized representation in bytes.
    pub fn serialized_size_bytes(&self) -> usize {
        4 + 4 + self.num_bins() * 8
    }

    /// Serializes the store.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(self.serialized_size_bytes());
        write_store(self, &mut bytes);
        bytes.into_bytes()
    }

    /// Deserializes a store.
    ///
    /// Reconstruction replays `add(offset + i, bins[i])` for every physical
    /// bin rather than copying the buffer, so it goes through the same
    /// range-extension logic as live insertion. Zero-valued bins at the
    /// buffer boundary are dropped by the replay, which can leave the
    /// rebuilt store with a narrower logical key range than the one that
    /// was serialized. This is a characteristic of the format and is kept
    /// as is.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        read_store(&mut SketchSlice::new(bytes))
    }
}

fn write_store(store: &DenseStore, bytes: &mut SketchBytes) {
    bytes.write_i32_be(store.offset());
    bytes.write_u32_be(store.num_bins() as u32);
    for &bin in store.bins() {
        bytes.write_f64_be(bin);
    }
}

fn read_store(input: &mut SketchSlice<'_>) -> Result<DenseStore, Error> {
    let offset = input
        .read_i32_be()
        .map_err(|_| Error::insufficient_data("store_offset"))?;
    let num_bins = input
        .read_u32_be()
        .map_err(|_| Error::insufficient_data("num_bins"))?;

    let mut store = DenseStore::new();
    for i in 0..num_bins {
        let bin = input
            .read_f64_be()
            .map_err(|_| Error::insufficient_data("bin"))?;
        let key = offset as i64 + i as i64;
        let key = i32::try_from(key).map_err(|_| {
            Error::new(
                ErrorKind::MalformedDeserializeData,
                "bin key out of range while decoding store",
            )
            .with_context("key", key)
        })?;
        store.add(key, bin);
    }
    Ok(store)
}

impl<M: IndexMapping> DDSketch<M> {
    /// Returns the size of this sketch's serialized representation in bytes.
    pub fn serialized_size_bytes(&self) -> usize {
        MAPPING_SIZE_BYTES
            + self.positives().serialized_size_bytes()
            + self.negatives().serialized_size_bytes()
            + 8
    }

    /// Serializes the sketch: mapping, positive store, negative store, and
    /// zero-bucket count, in that order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(self.serialized_size_bytes());
        write_mapping(self.mapping(), &mut bytes);
        write_store(self.positives(), &mut bytes);
        write_store(self.negatives(), &mut bytes);
        bytes.write_f64_be(self.zero_count());
        bytes.into_bytes()
    }
}

impl DDSketch<LogarithmicMapping> {
    /// Deserializes a sketch.
    ///
    /// The decoded sketch answers quantile, extremum, and count queries
    /// equivalently to the one that was serialized, subject to the replay
    /// behavior documented on [`DenseStore::deserialize`]; the internal
    /// buffer layout is not guaranteed to round-trip byte-identically.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = SketchSlice::new(bytes);
        let mapping = read_mapping(&mut input)?;
        let positives = read_store(&mut input)?;
        let negatives = read_store(&mut input)?;
        let zero_count = input
            .read_f64_be()
            .map_err(|_| Error::insufficient_data("zero_count"))?;
        Ok(DDSketch::from_parts(
            mapping, positives, negatives, zero_count,
        ))
    }
}
