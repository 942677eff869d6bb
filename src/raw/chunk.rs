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

use bytes::Bytes;

/// ChunkBuffer is an immutable window over a span of an object.
///
/// A chunk truthfully holds the object bytes `[offset, offset + valid_bytes)`.
/// Refilling never mutates a chunk: the owner replaces it with a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkBuffer {
    offset: u64,
    data: Bytes,
}

impl ChunkBuffer {
    /// Create a chunk holding `data` that starts at `offset` of the object.
    pub fn new(offset: u64, data: Bytes) -> Self {
        Self { offset, data }
    }

    /// Create a chunk with no valid bytes at `offset`.
    ///
    /// This is how the end of an object is signaled.
    pub fn empty(offset: u64) -> Self {
        Self {
            offset,
            data: Bytes::new(),
        }
    }

    /// Object relative offset of the first byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of valid bytes in this chunk.
    pub fn valid_bytes(&self) -> usize {
        self.data.len()
    }

    /// Object relative offset right after the last valid byte.
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns `true` if this chunk holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check whether `position` falls inside the valid window.
    pub fn contains(&self, position: u64) -> bool {
        position >= self.offset && position < self.end()
    }

    /// Copy bytes starting at object `position` into `buf`.
    ///
    /// Returns the number of bytes copied, which is `0` when `position` is
    /// outside the valid window. `0` means the caller must refill, it does
    /// not mean the object has ended.
    pub fn read_at(&self, position: u64, buf: &mut [u8]) -> usize {
        if !self.contains(position) {
            return 0;
        }

        let start = (position - self.offset) as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        n
    }
}
