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
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::ErrorKind as IoErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use md5::Digest;

use crate::raw::*;
use crate::*;

const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// ContentDigest is the 128-bit MD5 digest of an object's full content.
///
/// Uploads always carry it so that the backend can verify the bytes it
/// received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    /// Wrap an already computed digest.
    pub fn from_bytes(bs: [u8; 16]) -> Self {
        ContentDigest(bs)
    }

    /// Digest of the given in-memory content.
    pub fn of(bs: &[u8]) -> Self {
        let mut hasher = md5::Md5::new();
        hasher.update(bs);
        ContentDigest(hasher.finalize().into())
    }

    /// Digest the whole stream.
    ///
    /// The stream is rewound to position 0 before reading and is left at
    /// position 0 afterwards, ready to be used as an upload body.
    pub fn compute<R: Read + Seek + ?Sized>(r: &mut R) -> Result<Self> {
        r.seek(SeekFrom::Start(0)).map_err(new_std_io_error)?;

        let mut hasher = md5::Md5::new();
        let mut buf = vec![0; DIGEST_BUFFER_SIZE];
        loop {
            match r.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buf[..n]),
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(new_std_io_error(err).with_operation("ContentDigest::compute"))
                }
            }
        }

        r.seek(SeekFrom::Start(0)).map_err(new_std_io_error)?;
        Ok(ContentDigest(hasher.finalize().into()))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Base64 form, as used by the `Content-MD5` header.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }
}

/// Lower case hex.
impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
