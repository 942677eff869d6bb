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

use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::io::ErrorKind as IoErrorKind;
use std::io::Read;

use bytes::Bytes;
use log::debug;
use log::error;
use log::warn;
use parking_lot::Mutex;

use crate::raw::*;
use crate::*;

const SESSION_TARGET: &str = "s3store::session";

/// ObjectSession owns the range fetches of one object.
///
/// The backend only exposes forward-only range responses, so the session
/// keeps the live response together with the position it is at. A chunk
/// requested at that position is served by continuing the response, any
/// other position reopens the fetch with a new range.
///
/// The size of the object is learned by the first open, which is always
/// an unranged fetch at offset 0.
///
/// Every chunk request that fails is retried exactly once after the
/// session has been fully reopened. A second failure is returned with
/// status persistent.
pub struct ObjectSession {
    acc: Accessor,
    bucket: String,
    key: String,
    sse: Option<ServerSideEncryption>,

    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    response: Option<FetchReader>,
    /// Position of the live response.
    cursor: u64,
    total: Option<u64>,
}

impl SessionState {
    fn close(&mut self) {
        self.response = None;
        self.cursor = 0;
    }
}

impl Debug for ObjectSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ObjectSession")
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("opened", &state.response.is_some())
            .field("cursor", &state.cursor)
            .field("total", &state.total)
            .finish()
    }
}

impl ObjectSession {
    /// Create a new session, nothing will be fetched until the first chunk
    /// is requested.
    pub fn new(
        acc: Accessor,
        bucket: &str,
        key: &str,
        sse: Option<ServerSideEncryption>,
    ) -> Self {
        Self {
            acc,
            bucket: bucket.to_string(),
            key: key.to_string(),
            sse,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Bucket of this object.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of this object.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Size of the object, `None` until the session has been opened.
    pub fn total_bytes(&self) -> Option<u64> {
        self.state.lock().total
    }

    /// Fetch a chunk of at most `capacity` bytes starting at `offset`.
    ///
    /// Returns an empty chunk if `offset` is at or beyond the end of the
    /// object.
    pub fn chunk(&self, offset: u64, capacity: usize) -> Result<ChunkBuffer> {
        let mut state = self.state.lock();

        let err = match self.try_chunk(&mut state, offset, capacity) {
            Ok(chunk) => return Ok(chunk),
            Err(err) => err,
        };
        warn!(
            target: SESSION_TARGET,
            "bucket={} key={} offset={} -> fetch failed, reopen and retry: {}",
            self.bucket,
            self.key,
            offset,
            err
        );
        state.close();

        match self.try_chunk(&mut state, offset, capacity) {
            Ok(chunk) => {
                debug!(
                    target: SESSION_TARGET,
                    "bucket={} key={} offset={} -> recovered after retry",
                    self.bucket,
                    self.key,
                    offset
                );
                Ok(chunk)
            }
            Err(err) => {
                error!(
                    target: SESSION_TARGET,
                    "bucket={} key={} offset={} -> failed after retry: {}",
                    self.bucket,
                    self.key,
                    offset,
                    err
                );
                state.close();

                let err = if err.is_temporary() {
                    err.set_persistent()
                } else {
                    err
                };
                Err(err
                    .with_operation("ObjectSession::chunk")
                    .with_context("bucket", &self.bucket)
                    .with_context("key", &self.key)
                    .with_context("offset", offset))
            }
        }
    }

    fn try_chunk(
        &self,
        state: &mut SessionState,
        offset: u64,
        capacity: usize,
    ) -> Result<ChunkBuffer> {
        let total = match state.total {
            Some(total) => total,
            None => self.open(state, 0)?,
        };

        if offset >= total {
            return Ok(ChunkBuffer::empty(offset));
        }

        if state.response.is_none() || state.cursor != offset {
            debug!(
                target: SESSION_TARGET,
                "bucket={} key={} -> reposition from {} to {}",
                self.bucket,
                self.key,
                state.cursor,
                offset
            );
            self.open(state, offset)?;
        }

        self.fill(state, offset, capacity)
    }

    /// Open the fetch at `offset`, returns the size of the object.
    fn open(&self, state: &mut SessionState, offset: u64) -> Result<u64> {
        state.close();

        let range = match state.total {
            Some(total) if offset != 0 => BytesRange::new(Some(offset), Some(total - offset)),
            _ => BytesRange::default(),
        };
        let args = OpFetch::new()
            .with_range(range)
            .with_server_side_encryption(self.sse.clone());

        let (rp, response) = self.acc.fetch(&self.bucket, &self.key, args)?;
        let total = offset + rp.content_length();

        state.response = Some(response);
        state.cursor = offset;
        state.total = Some(total);
        Ok(total)
    }

    fn fill(&self, state: &mut SessionState, offset: u64, capacity: usize) -> Result<ChunkBuffer> {
        let total = state.total.unwrap_or(offset);
        let want = (capacity as u64).min(total.saturating_sub(offset)) as usize;

        let response = state.response.as_mut().ok_or_else(|| {
            Error::new(ErrorKind::Unexpected, "range response is not opened")
                .with_operation("ObjectSession::fill")
        })?;

        let mut buf = vec![0; want];
        let mut filled = 0;
        while filled < want {
            match response.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::new(
                        ErrorKind::Unexpected,
                        "range response ended before object end",
                    )
                    .with_operation("ObjectSession::fill")
                    .with_context("position", offset + filled as u64)
                    .with_context("total", total)
                    .set_temporary())
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(new_std_io_error(err)
                        .with_operation("ObjectSession::fill")
                        .with_context("position", offset + filled as u64))
                }
            }
        }

        state.cursor = offset + want as u64;
        Ok(ChunkBuffer::new(offset, Bytes::from(buf)))
    }
}

impl Drop for ObjectSession {
    fn drop(&mut self) {
        if self.state.get_mut().response.take().is_some() {
            debug!(
                target: SESSION_TARGET,
                "bucket={} key={} -> closed",
                self.bucket,
                self.key
            );
        }
    }
}
