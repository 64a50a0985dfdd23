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

//! Byte-level helpers for the sketch wire format.
//!
//! All multi-byte fields in the format are big-endian.

use std::io;
use std::io::Cursor;
use std::io::Read;

use byteorder::BigEndian;
use byteorder::ByteOrder;

/// A simple wrapper around a `Vec<u8>` that provides methods for writing the
/// field types used by the sketch format.
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    /// Constructs an empty `SketchBytes` with at least the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Consumes the `SketchBytes` and returns the underlying `Vec<u8>`.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes the given byte slice to the `SketchBytes`.
    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    /// Writes a 32-bit signed integer in big-endian byte order.
    pub fn write_i32_be(&mut self, n: i32) {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, n);
        self.write(&buf);
    }

    /// Writes a 32-bit unsigned integer in big-endian byte order.
    pub fn write_u32_be(&mut self, n: u32) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, n);
        self.write(&buf);
    }

    /// Writes a 64-bit floating-point number in big-endian byte order.
    pub fn write_f64_be(&mut self, n: f64) {
        let mut buf = [0u8; 8];
        BigEndian::write_f64(&mut buf, n);
        self.write(&buf);
    }
}

/// A cursor over a serialized sketch that reads the field types used by the
/// sketch format and tracks how far into the input it has consumed.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl SketchSlice<'_> {
    pub fn new(slice: &[u8]) -> SketchSlice<'_> {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.slice.read_exact(buf)
    }

    /// Reads a 32-bit signed integer in big-endian byte order.
    pub fn read_i32_be(&mut self) -> io::Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(BigEndian::read_i32(&buf))
    }

    /// Reads a 32-bit unsigned integer in big-endian byte order.
    pub fn read_u32_be(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Reads a 64-bit floating-point number in big-endian byte order.
    pub fn read_f64_be(&mut self) -> io::Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(BigEndian::read_f64(&buf))
    }
}
