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
use std::io::Seek;
use std::io::SeekFrom;
use std::sync::Arc;

use anyhow::Result;
use md5::Digest;
use md5::Md5;
use pretty_assertions::assert_eq;
use s3store::services::Memory;
use s3store::*;

use crate::utils::*;

behavior_tests!(
    test_write_and_read_back,
    test_write_with_digest,
    test_write_with_wrong_digest,
    test_write_overwrite,
    test_delete,
    test_delete_not_exist,
);

/// Write without digest then read it back.
pub fn test_write_and_read_back(store: ResourceStore) -> Result<()> {
    let path = random_name();
    let content = gen_content();

    let mut source = Cursor::new(content.to_vec());
    store.write_resource(&mut source, None, &path)?;
    assert_eq!(source.position(), 0, "source must be rewound");

    let mut bs = Vec::new();
    store.open_resource(&path)?.read_to_end(&mut bs)?;
    assert!(bs == content, "read content");

    store.delete_resource(&path);
    Ok(())
}

/// Write with a digest computed by the caller.
pub fn test_write_with_digest(store: ResourceStore) -> Result<()> {
    let path = random_name();
    let content = gen_content();

    let mut source = Cursor::new(content.to_vec());
    let digest = ContentDigest::compute(&mut source)?;
    store.write_resource(&mut source, Some(digest), &path)?;

    let r = store.open_resource(&path)?;
    assert_eq!(r.len(), content.len() as u64);

    store.delete_resource(&path);
    Ok(())
}

/// A digest that doesn't match the content is rejected by the backend.
pub fn test_write_with_wrong_digest(store: ResourceStore) -> Result<()> {
    let path = random_name();

    let mut source = Cursor::new(b"Hello, World!".to_vec());
    let err = store
        .write_resource(&mut source, Some(ContentDigest::of(b"Hello")), &path)
        .unwrap_err();

    assert_eq!(err.context("code"), Some("BadDigest"));
    assert_eq!(
        store.open_resource(&path).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

/// Overwrite replaces the whole object.
pub fn test_write_overwrite(store: ResourceStore) -> Result<()> {
    let path = random_name();

    store.write_resource(&mut Cursor::new(gen_bytes(1024)), None, &path)?;
    store.write_resource(&mut Cursor::new(b"Hello, World!".to_vec()), None, &path)?;

    let mut s = String::new();
    store.open_resource(&path)?.read_to_string(&mut s)?;
    assert_eq!(s, "Hello, World!");

    store.delete_resource(&path);
    Ok(())
}

/// Delete removes the object.
pub fn test_delete(store: ResourceStore) -> Result<()> {
    let path = random_name();
    store.write_resource(&mut Cursor::new(b"Hello, World!".to_vec()), None, &path)?;

    store.delete_resource(&path);
    assert_eq!(
        store.open_resource(&path).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

/// Delete a missing object is fine.
pub fn test_delete_not_exist(store: ResourceStore) -> Result<()> {
    store.delete_resource(&random_name());
    Ok(())
}

#[test]
fn test_digest_matches_reference() -> Result<()> {
    let content = gen_content();
    let mut source = Cursor::new(content.to_vec());
    assert_eq!(source.position(), 0);

    let digest = ContentDigest::compute(&mut source)?;
    assert_eq!(source.position(), 0);

    let mut hasher = Md5::new();
    hasher.update(&content);
    assert_eq!(digest.as_bytes().as_slice(), hasher.finalize().as_slice());
    Ok(())
}

#[test]
fn test_digest_of_seeked_source() -> Result<()> {
    let content = gen_bytes(100 * 1024);
    let mut source = Cursor::new(content.to_vec());
    source.seek(SeekFrom::Start(4096))?;

    let digest = ContentDigest::compute(&mut source)?;
    assert_eq!(digest, ContentDigest::of(&content));
    assert_eq!(source.position(), 0);
    Ok(())
}

#[test]
fn test_write_uses_store_encryption() -> Result<()> {
    init_logger();
    let key = Arc::new(CustomerKey::generate());

    let cases = vec![
        ("s3", None),
        ("s3e", Some(ServerSideEncryption::ServerManaged)),
        (
            "s3x",
            Some(ServerSideEncryption::CustomerProvided(key.clone())),
        ),
    ];

    for (scheme, expected) in cases {
        let acc = FaultAccessor::default();
        let store = ResourceStore::with_accessor(
            &format!("{scheme}://{BUCKET}/data/"),
            acc.clone(),
            StoreOptions::default().with_customer_key(key.clone()),
        )?;

        store.write_resource(&mut Cursor::new(b"Hello, World!".to_vec()), None, "abc")?;
        store.open_resource("abc")?;

        assert_eq!(acc.upload_sse(), vec![expected.clone()], "{scheme}");
        assert_eq!(acc.fetch_sse(), vec![expected], "{scheme}");
        assert_eq!(
            acc.memory().get(BUCKET, "data/abc").as_deref(),
            Some(b"Hello, World!".as_slice())
        );
    }
    Ok(())
}

#[test]
fn test_key_managed_is_rejected() {
    let err = ResourceStore::with_accessor(
        &format!("s3k://{BUCKET}/data/"),
        Memory::default(),
        StoreOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn test_delete_failure_is_swallowed() -> Result<()> {
    init_logger();
    let acc = FaultAccessor::default();
    acc.fail_deletes();

    let store = ResourceStore::with_accessor(
        &format!("s3://{BUCKET}/"),
        acc.clone(),
        StoreOptions::default(),
    )?;
    store.write_resource(&mut Cursor::new(b"Hello, World!".to_vec()), None, "abc")?;

    store.delete_resource("abc");
    assert!(acc.memory().get(BUCKET, "abc").is_some());
    Ok(())
}

#[test]
fn test_location_prefix_and_key() -> Result<()> {
    let store = ResourceStore::with_accessor(
        "s3x://mybucket/data/",
        Memory::default(),
        StoreOptions::default(),
    )?;

    assert_eq!(store.location().bucket(), "mybucket");
    assert_eq!(store.location().prefix(), "data/");
    assert_eq!(store.build_key("abc"), "data/abc");
    Ok(())
}
