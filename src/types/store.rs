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
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::error;
use log::warn;

use crate::layers::Layer;
use crate::layers::LoggingLayer;
use crate::raw::*;
use crate::services::S3Builder;
use crate::*;

const STORE_TARGET: &str = "s3store::store";

/// Default capacity of the chunks fetched by readers.
const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Options used to build a [`ResourceStore`].
#[derive(Clone)]
pub struct StoreOptions {
    chunk_size: usize,
    customer_key: Arc<CustomerKey>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            customer_key: CustomerKey::process(),
        }
    }
}

impl Debug for StoreOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("chunk_size", &self.chunk_size)
            .field("customer_key", &self.customer_key)
            .finish()
    }
}

impl StoreOptions {
    /// Set the capacity of the chunks fetched by readers, must be greater
    /// than zero.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Use `key` instead of the process-wide key for customer provided
    /// encryption.
    pub fn with_customer_key(mut self, key: Arc<CustomerKey>) -> Self {
        self.customer_key = key;
        self
    }

    /// Capacity of the chunks fetched by readers.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Key used for customer provided encryption.
    pub fn customer_key(&self) -> &Arc<CustomerKey> {
        &self.customer_key
    }
}

/// ResourceStore is the entry of s3store: a bucket, a key prefix and an
/// encryption policy on top of a backend.
///
/// A store is immutable and cheap to clone. Every reader opened from it
/// holds its own handle to the backend, so readers stay valid after the
/// store is dropped.
///
/// # Examples
///
/// ```
/// use s3store::services::Memory;
/// use s3store::ResourceStore;
/// use s3store::StoreOptions;
///
/// # fn main() -> s3store::Result<()> {
/// let store = ResourceStore::with_accessor("s3x://mybucket/data/", Memory::default(), StoreOptions::default())?;
///
/// assert_eq!(store.location().bucket(), "mybucket");
/// assert_eq!(store.build_key("abc"), "data/abc");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResourceStore {
    location: StoreLocation,
    sse: Option<ServerSideEncryption>,
    chunk_size: usize,
    acc: Accessor,
}

impl Debug for ResourceStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStore")
            .field("location", &self.location.to_string())
            .field("chunk_size", &self.chunk_size)
            .field("accessor", &self.acc.info())
            .finish()
    }
}

impl ResourceStore {
    /// Create a store on s3, the s3 config is loaded from environment.
    ///
    /// See [`S3Config::from_env`][crate::services::S3Config::from_env].
    pub fn new(location: &str) -> Result<Self> {
        let s3 = S3Builder::from_env().build()?;
        Self::with_accessor(location, s3, StoreOptions::default())
    }

    /// Create a store on the given backend.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`] if the location is malformed, if
    /// its encryption mode is not supported or if the chunk size is zero.
    pub fn with_accessor(
        location: &str,
        acc: impl Access,
        options: StoreOptions,
    ) -> Result<Self> {
        let location: StoreLocation = location.parse()?;

        if options.chunk_size == 0 {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "chunk size must be greater than zero")
                    .with_operation("ResourceStore::with_accessor")
                    .with_context("chunk_size", options.chunk_size),
            );
        }

        let sse = location
            .encryption()
            .server_side_encryption(&options.customer_key)
            .map_err(|err| {
                err.with_operation("ResourceStore::with_accessor")
                    .with_context("location", &location)
            })?;

        let acc = LoggingLayer.layer(Arc::new(acc));
        debug!(
            target: STORE_TARGET,
            "location={} service={} chunk_size={} -> store created",
            location,
            acc.info().scheme(),
            options.chunk_size
        );

        Ok(Self {
            location,
            sse,
            chunk_size: options.chunk_size,
            acc,
        })
    }

    /// Location of this store.
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Capacity of the chunks fetched by readers.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Build the object key of `path`.
    ///
    /// The key is the prefix followed by the path, the path is neither
    /// escaped nor normalized.
    pub fn build_key(&self, path: &str) -> String {
        format!("{}{}", self.location.prefix(), path)
    }

    /// Open a reader on `path`.
    ///
    /// The first chunk is fetched before this call returns, so a missing
    /// object is reported here.
    pub fn open_resource(&self, path: &str) -> Result<ObjectReader> {
        let key = self.build_key(path);
        let session = ObjectSession::new(
            self.acc.clone(),
            self.location.bucket(),
            &key,
            self.sse.clone(),
        );

        ObjectReader::new(session, self.chunk_size)
            .map_err(|err| err.with_operation("ResourceStore::open_resource"))
    }

    /// Write the whole content of `source` to `path`, returns the time the
    /// upload took.
    ///
    /// If `digest` is `None`, the digest is computed by reading `source`
    /// from the start. `source` is always rewound to its start before the
    /// upload and is not closed.
    pub fn write_resource(
        &self,
        source: &mut (impl Read + Seek),
        digest: Option<ContentDigest>,
        path: &str,
    ) -> Result<Duration> {
        let digest = match digest {
            Some(digest) => digest,
            None => ContentDigest::compute(source)?,
        };

        let size = source
            .seek(SeekFrom::End(0))
            .and_then(|size| source.seek(SeekFrom::Start(0)).map(|_| size))
            .map_err(|err| new_std_io_error(err).with_operation("ResourceStore::write_resource"))?;

        let key = self.build_key(path);
        let args = OpUpload::new(size, digest).with_server_side_encryption(self.sse.clone());

        let start = Instant::now();
        match self.acc.upload(self.location.bucket(), &key, args, source) {
            Ok(_) => Ok(start.elapsed()),
            Err(err) => {
                error!(
                    target: STORE_TARGET,
                    "bucket={} key={} request_id={} host_id={} code={} -> upload failed: {}",
                    self.location.bucket(),
                    key,
                    err.context("request_id").unwrap_or("-"),
                    err.context("host_id").unwrap_or("-"),
                    err.context("code").unwrap_or("-"),
                    err.message()
                );
                Err(err.with_operation("ResourceStore::write_resource"))
            }
        }
    }

    /// Delete `path`.
    ///
    /// Deletion is best-effort: failures are logged and never returned.
    pub fn delete_resource(&self, path: &str) {
        let key = self.build_key(path);

        if let Err(err) = self.acc.delete(self.location.bucket(), &key) {
            warn!(
                target: STORE_TARGET,
                "bucket={} key={} -> delete failed: {}",
                self.location.bucket(),
                key,
                err
            );
        }
    }
}
