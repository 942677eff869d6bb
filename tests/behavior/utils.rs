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

use std::collections::HashSet;
use std::env;
use std::io;
use std::io::Read;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use log::warn;
use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::prelude::*;
use s3store::raw::*;
use s3store::services::Memory;
use s3store::*;

pub const BUCKET: &str = "bucket";

/// Generate test cases for every store we can build.
///
/// - `memory`: always run.
/// - `s3`: run only when `S3STORE_S3_TEST` is `on`, the store is built from
///   `S3STORE_S3_LOCATION` and the standard AWS environment variables.
macro_rules! behavior_tests {
    ($($test:ident),* $(,)?) => {
        mod memory {
            $(
                #[test]
                fn $test() -> anyhow::Result<()> {
                    super::$test($crate::utils::init_memory_store())
                }
            )*
        }

        mod s3 {
            $(
                #[test]
                fn $test() -> anyhow::Result<()> {
                    match $crate::utils::init_s3_store() {
                        Some(store) => super::$test(store),
                        None => {
                            log::warn!("service s3 not initiated, ignored");
                            Ok(())
                        }
                    }
                }
            )*
        }
    };
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn random_name() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

pub fn init_memory_store() -> ResourceStore {
    init_logger();

    let location = format!("s3://{BUCKET}/{}/", random_name());
    ResourceStore::with_accessor(&location, Memory::default(), StoreOptions::default())
        .expect("memory store must build")
}

pub fn init_s3_store() -> Option<ResourceStore> {
    init_logger();

    let turn_on_test = env::var("S3STORE_S3_TEST").unwrap_or_default();
    if turn_on_test != "on" && turn_on_test != "true" {
        return None;
    }

    let location = env::var("S3STORE_S3_LOCATION").expect("S3STORE_S3_LOCATION must be set");
    let location = format!("{}/{}/", location.trim_end_matches('/'), random_name());

    Some(ResourceStore::new(&location).expect("s3 store must build"))
}

pub fn gen_bytes(size: usize) -> Bytes {
    let mut content = vec![0; size];
    thread_rng().fill_bytes(&mut content);
    content.into()
}

/// Generate random content with a size from 1B to 256KiB.
pub fn gen_content() -> Bytes {
    let size = thread_rng().gen_range(1..256 * 1024);
    gen_bytes(size)
}

/// Shared state of a [`FaultAccessor`] and the readers it hands out.
#[derive(Debug, Default)]
pub struct FaultState {
    fetches: AtomicUsize,
    reads: AtomicUsize,
    live_readers: AtomicUsize,
    fail_reads: Mutex<HashSet<usize>>,
    read_positions: Mutex<Vec<u64>>,
    fetch_ranges: Mutex<Vec<BytesRange>>,
    fetch_sse: Mutex<Vec<Option<ServerSideEncryption>>>,
    upload_sse: Mutex<Vec<Option<ServerSideEncryption>>>,
    fail_deletes: Mutex<bool>,
}

/// FaultAccessor wraps [`Memory`] to inject read failures and to track
/// every fetch it serves.
#[derive(Debug, Clone, Default)]
pub struct FaultAccessor {
    inner: Memory,
    state: Arc<FaultState>,
}

impl FaultAccessor {
    pub fn with_object(key: &str, content: Bytes) -> Self {
        let acc = Self::default();
        acc.inner.insert(BUCKET, key, content);
        acc
    }

    pub fn memory(&self) -> &Memory {
        &self.inner
    }

    /// Fail the `n`-th read (1-based) on any fetch reader.
    pub fn fail_read(&self, n: usize) {
        self.state.fail_reads.lock().insert(n);
    }

    pub fn fail_deletes(&self) {
        *self.state.fail_deletes.lock() = true;
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn live_readers(&self) -> usize {
        self.state.live_readers.load(Ordering::SeqCst)
    }

    /// Object positions of every read that returned data.
    pub fn read_positions(&self) -> Vec<u64> {
        self.state.read_positions.lock().clone()
    }

    pub fn fetch_ranges(&self) -> Vec<BytesRange> {
        self.state.fetch_ranges.lock().clone()
    }

    pub fn fetch_sse(&self) -> Vec<Option<ServerSideEncryption>> {
        self.state.fetch_sse.lock().clone()
    }

    pub fn upload_sse(&self) -> Vec<Option<ServerSideEncryption>> {
        self.state.upload_sse.lock().clone()
    }
}

impl Access for FaultAccessor {
    fn info(&self) -> AccessorInfo {
        AccessorInfo::new("fault")
    }

    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        self.state.fetch_ranges.lock().push(args.range());
        self.state
            .fetch_sse
            .lock()
            .push(args.server_side_encryption().cloned());

        let position = args.range().offset().unwrap_or_default();
        let (rp, inner) = self.inner.fetch(bucket, key, args)?;

        self.state.live_readers.fetch_add(1, Ordering::SeqCst);
        let r = FaultReader {
            inner,
            position,
            state: self.state.clone(),
        };
        Ok((rp, Box::new(r)))
    }

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        self.state
            .upload_sse
            .lock()
            .push(args.server_side_encryption().cloned());

        self.inner.upload(bucket, key, args, body)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        if *self.state.fail_deletes.lock() {
            return Err(Error::new(ErrorKind::PermissionDenied, "delete is not allowed"));
        }

        self.inner.delete(bucket, key)
    }
}

struct FaultReader {
    inner: FetchReader,
    position: u64,
    state: Arc<FaultState>,
}

impl Read for FaultReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.state.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.state.fail_reads.lock().contains(&n) {
            warn!("injected failure on read {n} at position {}", self.position);
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "injected connection reset",
            ));
        }

        let size = self.inner.read(buf)?;
        if size > 0 {
            self.state.read_positions.lock().push(self.position);
            self.position += size as u64;
        }
        Ok(size)
    }
}

impl Drop for FaultReader {
    fn drop(&mut self) {
        self.state.live_readers.fetch_sub(1, Ordering::SeqCst);
    }
}
