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

use std::cmp::min;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

use crate::raw::*;
use crate::*;

/// ObjectReader is a seekable stream over a remote object.
///
/// Reads are served from the current chunk; a new chunk is fetched only
/// when the cursor leaves the one in hand. Seeking only moves the cursor.
///
/// A read returns fewer bytes than asked only at the end of the object. A
/// read that fails leaves the cursor where it was.
///
/// ObjectReader is not meant to be shared between threads: open one reader
/// per caller.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use std::io::Seek;
/// use std::io::SeekFrom;
///
/// use s3store::services::Memory;
/// use s3store::ResourceStore;
/// use s3store::StoreOptions;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let memory = Memory::default();
/// memory.insert("bucket", "abc", "Hello, World!");
///
/// let store = ResourceStore::with_accessor("s3://bucket", memory, StoreOptions::default())?;
/// let mut r = store.open_resource("abc")?;
/// assert_eq!(r.len(), 13);
///
/// r.seek(SeekFrom::End(-6))?;
/// let mut buf = [0; 16];
/// assert_eq!(r.read(&mut buf)?, 6);
/// assert_eq!(&buf[..6], b"World!");
///
/// // Reading at the end is not an error.
/// assert_eq!(r.read(&mut buf)?, 0);
/// # Ok(())
/// # }
/// ```
pub struct ObjectReader {
    session: ObjectSession,
    chunk: ChunkBuffer,
    cursor: u64,
    chunk_size: usize,
    len: u64,
}

impl Debug for ObjectReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("session", &self.session)
            .field("chunk_offset", &self.chunk.offset())
            .field("chunk_valid_bytes", &self.chunk.valid_bytes())
            .field("cursor", &self.cursor)
            .field("chunk_size", &self.chunk_size)
            .field("len", &self.len)
            .finish()
    }
}

impl ObjectReader {
    /// Create a reader and fetch the first chunk.
    pub fn new(session: ObjectSession, chunk_size: usize) -> Result<Self> {
        let chunk = session.chunk(0, chunk_size)?;
        let len = session.total_bytes().unwrap_or_default();

        Ok(ObjectReader {
            session,
            chunk,
            cursor: 0,
            chunk_size,
            len,
        })
    }

    /// Size of the object.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the object is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current position of the cursor.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// Move the cursor to `pos`, nothing is fetched.
    pub fn set_position(&mut self, pos: u64) {
        self.cursor = pos;
    }

    /// Bucket of the object.
    pub fn bucket(&self) -> &str {
        self.session.bucket()
    }

    /// Key of the object.
    pub fn key(&self) -> &str {
        self.session.key()
    }

    fn refill(&mut self) -> Result<()> {
        let chunk = self.session.chunk(self.cursor, self.chunk_size)?;
        if chunk.is_empty() {
            return Err(Error::new(
                ErrorKind::Unexpected,
                "object ended before its length, it may have been overwritten",
            )
            .with_operation("ObjectReader::read")
            .with_context("bucket", self.session.bucket())
            .with_context("key", self.session.key())
            .with_context("position", self.cursor)
            .with_context("len", self.len));
        }

        self.chunk = chunk;
        Ok(())
    }
}

impl Read for ObjectReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = self.cursor;
        let remaining = self.len.saturating_sub(self.cursor);
        let mut to_read = min(buf.len() as u64, remaining) as usize;
        let mut read = 0;

        while to_read > 0 {
            let n = self.chunk.read_at(self.cursor, &mut buf[read..read + to_read]);
            self.cursor += n as u64;
            read += n;
            to_read -= n;

            if to_read > 0 && (n == 0 || self.cursor >= self.chunk.end()) {
                if let Err(err) = self.refill() {
                    // A failed read consumes nothing.
                    self.cursor = start;
                    return Err(err.into());
                }
            }
        }

        Ok(read)
    }
}

impl Seek for ObjectReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => (n as i128, 0),
            SeekFrom::End(n) => (self.len as i128, n as i128),
            SeekFrom::Current(n) => (self.cursor as i128, n as i128),
        };

        let target = base + offset;
        if target < 0 || target > u64::MAX as i128 {
            return Err(Error::new(
                ErrorKind::ContractViolation,
                "invalid seek to a negative or overflowing position",
            )
            .with_operation("ObjectReader::seek")
            .with_context("position", target)
            .into());
        }

        self.cursor = target as u64;
        Ok(self.cursor)
    }
}
