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

use anyhow::Result;
use rand::prelude::*;
use s3store::*;

use crate::utils::*;

behavior_tests!(
    test_read_full,
    test_read_range,
    test_read_not_exist,
    test_read_empty,
    test_seek_and_read,
    test_seek_before_start,
);

fn write(store: &ResourceStore, path: &str, content: &[u8]) -> Result<()> {
    store.write_resource(&mut Cursor::new(content), None, path)?;
    Ok(())
}

/// Read the whole object back.
pub fn test_read_full(store: ResourceStore) -> Result<()> {
    let path = random_name();
    let content = gen_content();
    write(&store, &path, &content)?;

    let mut r = store.open_resource(&path)?;
    assert_eq!(r.len(), content.len() as u64);

    let mut bs = Vec::new();
    r.read_to_end(&mut bs)?;
    assert_eq!(bs.len(), content.len(), "read size");
    assert!(bs == content, "read content");

    store.delete_resource(&path);
    Ok(())
}

/// Read a random range of the object.
pub fn test_read_range(store: ResourceStore) -> Result<()> {
    let path = random_name();
    let content = gen_content();
    write(&store, &path, &content)?;

    let mut rng = thread_rng();
    let offset = rng.gen_range(0..content.len());
    let size = rng.gen_range(0..=content.len() - offset);

    let mut r = store.open_resource(&path)?;
    r.seek(SeekFrom::Start(offset as u64))?;
    let mut bs = vec![0; size];
    r.read_exact(&mut bs)?;
    assert!(bs == content[offset..offset + size], "read content");

    store.delete_resource(&path);
    Ok(())
}

/// Open a missing object should return NotFound.
pub fn test_read_not_exist(store: ResourceStore) -> Result<()> {
    let err = store.open_resource(&random_name()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    Ok(())
}

/// Read an empty object returns nothing.
pub fn test_read_empty(store: ResourceStore) -> Result<()> {
    let path = random_name();
    write(&store, &path, &[])?;

    let mut r = store.open_resource(&path)?;
    assert!(r.is_empty());
    let mut buf = [0; 16];
    assert_eq!(r.read(&mut buf)?, 0);

    store.delete_resource(&path);
    Ok(())
}

/// Seek to the end returns 0 bytes, seeking back works again.
pub fn test_seek_and_read(store: ResourceStore) -> Result<()> {
    let path = random_name();
    let content = gen_bytes(40 * 1024);
    write(&store, &path, &content)?;

    let mut r = store.open_resource(&path)?;
    let mut buf = [0; 1024];

    assert_eq!(r.seek(SeekFrom::End(0))?, content.len() as u64);
    assert_eq!(r.read(&mut buf)?, 0);

    assert_eq!(r.seek(SeekFrom::End(-1024))?, content.len() as u64 - 1024);
    assert_eq!(r.read(&mut buf)?, 1024);
    assert!(buf[..] == content[content.len() - 1024..]);

    r.set_position(100);
    assert_eq!(r.read(&mut buf)?, 1024);
    assert!(buf[..] == content[100..1124]);
    assert_eq!(r.position(), 1124);

    store.delete_resource(&path);
    Ok(())
}

/// Seek before start is a contract violation.
pub fn test_seek_before_start(store: ResourceStore) -> Result<()> {
    let path = random_name();
    write(&store, &path, b"Hello, World!")?;

    let mut r = store.open_resource(&path)?;
    let err = r.seek(SeekFrom::Start(0)).and_then(|_| r.seek(SeekFrom::Current(-1)));
    assert_eq!(err.unwrap_err().kind(), std::io::ErrorKind::InvalidInput);

    let err = r.seek(SeekFrom::End(-14)).unwrap_err();
    let err = s3store::raw::new_std_io_error(err);
    assert_eq!(err.kind(), ErrorKind::ContractViolation);

    store.delete_resource(&path);
    Ok(())
}
