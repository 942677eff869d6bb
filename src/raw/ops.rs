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

//! Ops provides the operation args struct like [`OpFetch`] for user.
//!
//! By using ops, users can add more context for operation.

use crate::raw::*;
use crate::*;

/// Args for `fetch` operation.
#[derive(Debug, Clone, Default)]
pub struct OpFetch {
    range: BytesRange,
    server_side_encryption: Option<ServerSideEncryption>,
}

impl OpFetch {
    /// Create a default `OpFetch` which will fetch the whole object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the range of the option.
    pub fn with_range(mut self, range: BytesRange) -> Self {
        self.range = range;
        self
    }

    /// Get range from option.
    pub fn range(&self) -> BytesRange {
        self.range
    }

    /// Set the encryption directives of the option.
    pub fn with_server_side_encryption(mut self, sse: Option<ServerSideEncryption>) -> Self {
        self.server_side_encryption = sse;
        self
    }

    /// Get the encryption directives from option.
    pub fn server_side_encryption(&self) -> Option<&ServerSideEncryption> {
        self.server_side_encryption.as_ref()
    }
}

/// Reply for `fetch` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpFetch {
    content_length: u64,
}

impl RpFetch {
    /// Create a new reply for `fetch`.
    pub fn new(content_length: u64) -> Self {
        RpFetch { content_length }
    }

    /// Length of the returned range.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }
}

/// Args for `upload` operation.
#[derive(Debug, Clone)]
pub struct OpUpload {
    content_length: u64,
    content_digest: ContentDigest,
    server_side_encryption: Option<ServerSideEncryption>,
}

impl OpUpload {
    /// Create a new `OpUpload`.
    ///
    /// Both the length and the digest of the body are required by the
    /// backend.
    pub fn new(content_length: u64, content_digest: ContentDigest) -> Self {
        Self {
            content_length,
            content_digest,
            server_side_encryption: None,
        }
    }

    /// Set the encryption directives of the option.
    pub fn with_server_side_encryption(mut self, sse: Option<ServerSideEncryption>) -> Self {
        self.server_side_encryption = sse;
        self
    }

    /// Get the content length from option.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Get the content digest from option.
    pub fn content_digest(&self) -> ContentDigest {
        self.content_digest
    }

    /// Get the encryption directives from option.
    pub fn server_side_encryption(&self) -> Option<&ServerSideEncryption> {
        self.server_side_encryption.as_ref()
    }
}

/// Reply for `upload` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpUpload {
    request_id: Option<String>,
}

impl RpUpload {
    /// Create a new reply for `upload`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request id assigned by the backend.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    /// Request id assigned by the backend, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}
