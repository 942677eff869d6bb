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
use std::io;
use std::io::Read;
use std::sync::Arc;

use log::debug;
use log::error;
use log::warn;

use crate::layers::Layer;
use crate::raw::*;
use crate::*;

const LOGGING_TARGET: &str = "s3store::services";

/// LoggingLayer will add logging for s3store.
///
/// # Logging
///
/// - s3store will log in structural way.
/// - Every operation will start with a `started` log entry.
/// - Every operation will finish with the following status:
///   - `finished`: the operation is successful.
///   - `errored`: the operation returns an expected error like `NotFound`.
///   - `failed`: the operation returns an unexpected error.
///
/// Fetch readers log the number of bytes they have read when they fail or
/// are dropped.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use s3store::layers::Layer;
/// use s3store::layers::LoggingLayer;
/// use s3store::services::Memory;
///
/// let _ = LoggingLayer.layer(Arc::new(Memory::default()));
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct LoggingLayer;

impl Layer for LoggingLayer {
    fn layer(&self, inner: Accessor) -> Accessor {
        Arc::new(LoggingAccessor {
            scheme: inner.info().scheme(),
            inner,
        })
    }
}

#[derive(Debug)]
pub struct LoggingAccessor {
    scheme: &'static str,
    inner: Accessor,
}

impl LoggingAccessor {
    fn log_error(&self, operation: &str, bucket: &str, key: &str, err: &Error) {
        if err.kind() == ErrorKind::NotFound {
            warn!(
                target: LOGGING_TARGET,
                "service={} operation={} bucket={} key={} -> errored: {}",
                self.scheme,
                operation,
                bucket,
                key,
                err
            );
        } else {
            error!(
                target: LOGGING_TARGET,
                "service={} operation={} bucket={} key={} -> failed: {}",
                self.scheme,
                operation,
                bucket,
                key,
                err
            );
        }
    }
}

impl Access for LoggingAccessor {
    fn info(&self) -> AccessorInfo {
        self.inner.info()
    }

    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        let range = args.range();
        debug!(
            target: LOGGING_TARGET,
            "service={} operation=fetch bucket={} key={} range={} -> started",
            self.scheme,
            bucket,
            key,
            range
        );

        match self.inner.fetch(bucket, key, args) {
            Ok((rp, r)) => {
                debug!(
                    target: LOGGING_TARGET,
                    "service={} operation=fetch bucket={} key={} range={} -> finished: {}B",
                    self.scheme,
                    bucket,
                    key,
                    range,
                    rp.content_length()
                );
                let r = LoggingReader {
                    scheme: self.scheme,
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    expected: rp.content_length(),
                    have_read: 0,
                    inner: r,
                };
                Ok((rp, Box::new(r)))
            }
            Err(err) => {
                self.log_error("fetch", bucket, key, &err);
                Err(err)
            }
        }
    }

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        let size = args.content_length();
        debug!(
            target: LOGGING_TARGET,
            "service={} operation=upload bucket={} key={} size={} -> started",
            self.scheme,
            bucket,
            key,
            size
        );

        self.inner
            .upload(bucket, key, args, body)
            .map(|rp| {
                debug!(
                    target: LOGGING_TARGET,
                    "service={} operation=upload bucket={} key={} size={} request_id={:?} -> finished",
                    self.scheme,
                    bucket,
                    key,
                    size,
                    rp.request_id()
                );
                rp
            })
            .map_err(|err| {
                self.log_error("upload", bucket, key, &err);
                err
            })
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        debug!(
            target: LOGGING_TARGET,
            "service={} operation=delete bucket={} key={} -> started",
            self.scheme,
            bucket,
            key
        );

        self.inner
            .delete(bucket, key)
            .map(|_| {
                debug!(
                    target: LOGGING_TARGET,
                    "service={} operation=delete bucket={} key={} -> finished",
                    self.scheme,
                    bucket,
                    key
                );
            })
            .map_err(|err| {
                self.log_error("delete", bucket, key, &err);
                err
            })
    }
}

/// `LoggingReader` is a wrapper of `FetchReader`, with logging functionality.
struct LoggingReader {
    scheme: &'static str,
    bucket: String,
    key: String,
    expected: u64,
    have_read: u64,
    inner: FetchReader,
}

impl Read for LoggingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.have_read += n as u64;
                Ok(n)
            }
            Err(err) => {
                warn!(
                    target: LOGGING_TARGET,
                    "service={} operation=fetch bucket={} key={} have_read={} expected={} read -> failed: {}",
                    self.scheme,
                    self.bucket,
                    self.key,
                    self.have_read,
                    self.expected,
                    err
                );
                Err(err)
            }
        }
    }
}

impl Drop for LoggingReader {
    fn drop(&mut self) {
        debug!(
            target: LOGGING_TARGET,
            "service={} operation=fetch bucket={} key={} have_read={} expected={} -> closed",
            self.scheme,
            self.bucket,
            self.key,
            self.have_read,
            self.expected
        );
    }
}
