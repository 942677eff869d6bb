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

use std::fmt::Debug;
use std::io::Read;
use std::sync::Arc;

use crate::raw::*;
use crate::*;

/// Forward-only reader over the body of a fetch response.
///
/// Any read may fail.
pub type FetchReader = Box<dyn Read + Send>;

/// Underlying trait of all backends for implementors.
///
/// # Note
///
/// Only service implementor should care about this trait, users need to
/// use [`ResourceStore`] instead.
///
/// # Operations
///
/// | Name | Description |
/// | ---- | ----------- |
/// | [`fetch`][Access::fetch] | Open a forward-only byte stream over a range of an object. |
/// | [`upload`][Access::upload] | Write a whole object from a borrowed reader. |
/// | [`delete`][Access::delete] | Remove an object. |
///
/// All calls are blocking and run on the calling thread. Implementations
/// must be safe to share between threads: every stream opened from a store
/// shares the same accessor.
pub trait Access: Send + Sync + Debug + 'static {
    /// Return the information of this backend.
    fn info(&self) -> AccessorInfo;

    /// Fetch the given range of an object.
    ///
    /// [`RpFetch::content_length`] is the length of the returned range, not
    /// of the object.
    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        let _ = (bucket, args);

        Err(Error::new(
            ErrorKind::Unsupported,
            "operation is not supported by underlying services",
        )
        .with_operation("Access::fetch")
        .with_context("key", key))
    }

    /// Upload a whole object.
    ///
    /// `body` is borrowed: the implementation must read exactly
    /// [`OpUpload::content_length`] bytes from it and must not close it.
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        let _ = (bucket, args, body);

        Err(Error::new(
            ErrorKind::Unsupported,
            "operation is not supported by underlying services",
        )
        .with_operation("Access::upload")
        .with_context("key", key))
    }

    /// Delete an object.
    ///
    /// Deleting an object that doesn't exist is not an error.
    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let _ = bucket;

        Err(Error::new(
            ErrorKind::Unsupported,
            "operation is not supported by underlying services",
        )
        .with_operation("Access::delete")
        .with_context("key", key))
    }
}

/// All accessors are shared this way.
pub type Accessor = Arc<dyn Access>;

impl<T: Access + ?Sized> Access for Arc<T> {
    fn info(&self) -> AccessorInfo {
        self.as_ref().info()
    }

    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        self.as_ref().fetch(bucket, key, args)
    }

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        self.as_ref().upload(bucket, key, args, body)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.as_ref().delete(bucket, key)
    }
}

/// Metadata for accessor, users can use this metadata to get information
/// of the underlying service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessorInfo {
    scheme: &'static str,
    name: String,
}

impl AccessorInfo {
    /// Create a new info for the given scheme.
    pub fn new(scheme: &'static str) -> Self {
        AccessorInfo {
            scheme,
            name: String::new(),
        }
    }

    /// Scheme of the backend, like `s3` or `memory`.
    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Name of the backend instance, like the endpoint of an s3 service.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set name of this backend.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}
