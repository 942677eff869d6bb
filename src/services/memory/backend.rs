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

use std::io::Cursor;
use std::io::Read;

use bytes::Bytes;

use super::core::MemoryCore;
use crate::raw::*;
use crate::*;

/// In memory service support.
///
/// Objects live as long as any clone of the service does. Clones share
/// the same objects, so a test can keep a handle to inspect what a store
/// wrote.
///
/// # Example
///
/// ```
/// use s3store::raw::Access;
/// use s3store::services::Memory;
///
/// let memory = Memory::default();
/// memory.insert("bucket", "data/abc", "Hello, World!");
///
/// assert_eq!(memory.get("bucket", "data/abc").as_deref(), Some(b"Hello, World!".as_slice()));
/// assert_eq!(memory.info().scheme(), "memory");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Memory {
    core: MemoryCore,
}

impl Memory {
    /// Put an object directly, without going through an upload.
    pub fn insert(&self, bucket: &str, key: &str, content: impl Into<Bytes>) {
        self.core.set(bucket, key, content.into())
    }

    /// Get the content of an object, if it exists.
    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.core.get(bucket, key)
    }
}

impl Access for Memory {
    fn info(&self) -> AccessorInfo {
        AccessorInfo::new("memory")
    }

    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        let bs = self.core.get(bucket, key).ok_or_else(|| {
            Error::new(ErrorKind::NotFound, "object not found")
                .with_operation("Memory::fetch")
                .with_context("bucket", bucket)
                .with_context("key", key)
        })?;

        let bs = args.range().apply_on_bytes(bs);
        Ok((RpFetch::new(bs.len() as u64), Box::new(Cursor::new(bs))))
    }

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        // Grow with the body, the declared length is not trusted.
        let mut bs = Vec::new();
        body.take(args.content_length())
            .read_to_end(&mut bs)
            .map_err(|err| new_std_io_error(err).with_operation("Memory::upload"))?;

        if bs.len() as u64 != args.content_length() {
            return Err(Error::new(
                ErrorKind::Unexpected,
                "body is shorter than the declared content length",
            )
            .with_operation("Memory::upload")
            .with_context("key", key)
            .with_context("content_length", args.content_length())
            .with_context("actual", bs.len()));
        }

        if ContentDigest::of(&bs) != args.content_digest() {
            return Err(Error::new(
                ErrorKind::Unexpected,
                "The Content-MD5 you specified did not match what we received.",
            )
            .with_operation("Memory::upload")
            .with_context("key", key)
            .with_context("code", "BadDigest"));
        }

        self.core.set(bucket, key, Bytes::from(bs));
        Ok(RpUpload::new())
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.core.delete(bucket, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_range() {
        let m = Memory::default();
        m.insert("bucket", "abc", "Hello, World!");

        let (rp, mut r) = m
            .fetch(
                "bucket",
                "abc",
                OpFetch::new().with_range(BytesRange::new(Some(7), Some(6))),
            )
            .unwrap();
        let mut s = String::new();
        r.read_to_string(&mut s).unwrap();

        assert_eq!(rp.content_length(), 6);
        assert_eq!(s, "World!");
    }

    #[test]
    fn test_fetch_not_found() {
        let err = Memory::default()
            .fetch("bucket", "abc", OpFetch::new())
            .err().expect("fetch should fail");

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_upload_verifies_digest() {
        let m = Memory::default();
        let mut body: &[u8] = b"Hello, World!";

        let err = m
            .upload(
                "bucket",
                "abc",
                OpUpload::new(13, ContentDigest::of(b"something else")),
                &mut body,
            )
            .unwrap_err();
        assert_eq!(err.context("code"), Some("BadDigest"));
        assert!(m.get("bucket", "abc").is_none());
    }

    #[test]
    fn test_upload_declared_length_is_not_preallocated() {
        let m = Memory::default();
        let mut body: &[u8] = b"Hello, World!";

        let err = m
            .upload(
                "bucket",
                "abc",
                OpUpload::new(u64::MAX, ContentDigest::of(b"Hello, World!")),
                &mut body,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.context("actual"), Some("13"));
        assert!(m.get("bucket", "abc").is_none());
    }

    #[test]
    fn test_upload_and_delete() {
        let m = Memory::default();
        let mut body: &[u8] = b"Hello, World!";

        m.upload(
            "bucket",
            "abc",
            OpUpload::new(13, ContentDigest::of(b"Hello, World!")),
            &mut body,
        )
        .unwrap();
        assert_eq!(m.get("bucket", "abc"), Some(Bytes::from("Hello, World!")));

        m.delete("bucket", "abc").unwrap();
        assert!(m.get("bucket", "abc").is_none());

        // Deleting a missing object succeeds.
        m.delete("bucket", "abc").unwrap();
    }
}
