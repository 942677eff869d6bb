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

use bytes::Buf;
use bytes::Bytes;

use crate::raw::*;
use crate::*;

/// Body used in blocking HTTP requests.
///
/// The reader variant is borrowed, so the caller keeps ownership of the
/// source and decides when to close it.
#[derive(Default)]
pub enum Body<'a> {
    /// An empty body.
    #[default]
    Empty,
    /// Body with bytes.
    Bytes(Bytes),
    /// Body with a borrowed reader.
    Reader(&'a mut dyn Read),
}

impl Debug for Body<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Bytes(bs) => write!(f, "Body::Bytes({} bytes)", bs.len()),
            Body::Reader(_) => write!(f, "Body::Reader"),
        }
    }
}

impl Read for Body<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Body::Empty => Ok(0),
            Body::Bytes(bs) => {
                let size = min(bs.len(), buf.len());
                buf[..size].copy_from_slice(&bs[..size]);
                bs.advance(size);
                Ok(size)
            }
            Body::Reader(r) => r.read(buf),
        }
    }
}

/// IncomingBody carries the content returned by remote servers.
///
/// # Notes
///
/// Client SHOULD NEVER construct this body.
pub struct IncomingBody {
    inner: Box<dyn Read + Send + Sync>,
}

impl IncomingBody {
    /// Construct a new incoming body.
    pub fn new(inner: Box<dyn Read + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Consume the entire body.
    pub fn consume(mut self) -> Result<()> {
        io::copy(&mut self.inner, &mut io::sink()).map_err(|err| {
            new_std_io_error(err).with_operation("http_util::IncomingBody::consume")
        })?;

        Ok(())
    }

    /// Consume the response to bytes.
    ///
    /// Only use this for small bodies like error responses.
    pub fn read_to_bytes(mut self) -> Result<Bytes> {
        let mut bs = Vec::new();
        self.inner.read_to_end(&mut bs).map_err(|err| {
            new_std_io_error(err).with_operation("http_util::IncomingBody::read_to_bytes")
        })?;

        Ok(bs.into())
    }
}

impl Debug for IncomingBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingBody").finish_non_exhaustive()
    }
}

impl Read for IncomingBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
