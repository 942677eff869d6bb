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

use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::thread;

use anyhow::Result;
use pretty_assertions::assert_eq;
use rand::prelude::*;
use s3store::raw::*;
use s3store::*;

use crate::utils::*;

const OBJECT_SIZE: usize = 50000;
const CHUNK_SIZE: usize = 16384;

fn fault_store(content_size: usize) -> (FaultAccessor, ResourceStore, bytes::Bytes) {
    init_logger();

    let content = gen_bytes(content_size);
    let acc = FaultAccessor::with_object("object", content.clone());
    let store = ResourceStore::with_accessor(
        &format!("s3://{BUCKET}/"),
        acc.clone(),
        StoreOptions::default().with_chunk_size(CHUNK_SIZE),
    )
    .expect("store must build");

    (acc, store, content)
}

fn read_once(r: &mut ObjectReader, size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0; size];
    let n = r.read(&mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

#[test]
fn test_sequential_reads_fetch_each_chunk_once() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;
    assert_eq!(r.len(), OBJECT_SIZE as u64);

    let mut got = Vec::new();
    for _ in 0..5 {
        let bs = read_once(&mut r, 10000)?;
        assert_eq!(bs.len(), 10000);
        got.extend_from_slice(&bs);
    }
    assert_eq!(read_once(&mut r, 10000)?.len(), 0);
    assert_eq!(got, content.to_vec());

    // Four chunks served by one continuous range response.
    assert_eq!(acc.read_positions(), vec![0, 16384, 32768, 49152]);
    assert_eq!(acc.fetches(), 1);

    drop(r);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_read_tail_after_seek() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    r.seek(SeekFrom::Start(48384))?;
    let bs = read_once(&mut r, 10000)?;
    assert_eq!(bs.len(), 1616);
    assert_eq!(bs, content[48384..].to_vec());
    assert_eq!(read_once(&mut r, 10000)?.len(), 0);

    // The first fetch learns the size, the seek reopens with a range.
    assert_eq!(
        acc.fetch_ranges(),
        vec![BytesRange::default(), BytesRange::from(48384..50000)]
    );
    assert_eq!(acc.live_readers(), 1);
    drop(r);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_reads_inside_chunk_never_fetch() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    for offset in [100, 5000, 0, 16000] {
        r.seek(SeekFrom::Start(offset))?;
        let bs = read_once(&mut r, 384)?;
        assert_eq!(bs, content[offset as usize..offset as usize + 384].to_vec());
    }

    assert_eq!(acc.fetches(), 1);
    assert_eq!(acc.read_positions(), vec![0]);
    Ok(())
}

#[test]
fn test_random_ranges_match_reference() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;
    let mut rng = thread_rng();

    for _ in 0..200 {
        let offset = rng.gen_range(0..OBJECT_SIZE);
        let size = rng.gen_range(0..=OBJECT_SIZE - offset);

        r.seek(SeekFrom::Start(offset as u64))?;
        let mut bs = vec![0; size];
        r.read_exact(&mut bs)?;
        assert_eq!(bs, content[offset..offset + size].to_vec(), "offset {offset} size {size}");

        // Never more than one live response per reader.
        assert!(acc.live_readers() <= 1);
    }

    drop(r);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_read_past_end() -> Result<()> {
    let (_, store, _) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    r.seek(SeekFrom::End(0))?;
    assert_eq!(read_once(&mut r, 1)?.len(), 0);

    r.seek(SeekFrom::Start(OBJECT_SIZE as u64 + 1024))?;
    assert_eq!(read_once(&mut r, 1024)?.len(), 0);

    let err = r.seek(SeekFrom::Start(0)).and_then(|_| r.seek(SeekFrom::Current(-1)));
    assert_eq!(err.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    Ok(())
}

#[test]
fn test_single_failure_is_retried_once() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    // Read 1 filled the first chunk, fail the read of the second.
    acc.fail_read(2);

    let mut bs = Vec::new();
    r.read_to_end(&mut bs)?;
    assert_eq!(bs, content.to_vec());

    // The broken response was dropped and the range reopened once.
    assert_eq!(acc.fetches(), 2);
    assert_eq!(
        acc.fetch_ranges(),
        vec![BytesRange::default(), BytesRange::from(16384..50000)]
    );
    drop(r);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_second_failure_is_fatal() -> Result<()> {
    let (acc, store, _) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    acc.fail_read(2);
    acc.fail_read(3);

    // Continue the live response so that only the retry reopens.
    r.seek(SeekFrom::Start(16384))?;
    let err = read_once(&mut r, 100).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);

    let err = err
        .into_inner()
        .and_then(|err| err.downcast::<Error>().ok())
        .expect("must carry s3store error");
    assert!(err.is_persistent());
    assert_eq!(err.operation(), "ObjectSession::chunk");
    assert_eq!(err.context("bucket"), Some(BUCKET));
    assert_eq!(err.context("key"), Some("object"));
    assert_eq!(err.context("offset"), Some("16384"));

    // No third attempt, and nothing left open.
    assert_eq!(acc.fetches(), 2);
    assert_eq!(acc.live_readers(), 0);

    // The reader can still be used once the backend recovers.
    let bs = read_once(&mut r, 100)?;
    assert_eq!(bs.len(), 100);
    assert_eq!(acc.fetches(), 3);
    Ok(())
}

#[test]
fn test_failure_across_chunk_boundary_is_retried() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    // The read starts inside chunk 0 and needs the refill at 16384.
    acc.fail_read(2);
    r.seek(SeekFrom::Start(10000))?;
    let bs = read_once(&mut r, 20000)?;

    assert_eq!(bs.len(), 20000);
    assert_eq!(bs, content[10000..30000].to_vec());
    assert_eq!(r.position(), 30000);
    assert_eq!(acc.fetches(), 2);
    Ok(())
}

#[test]
fn test_fatal_failure_across_chunk_boundary() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;

    acc.fail_read(2);
    acc.fail_read(3);
    r.seek(SeekFrom::Start(10000))?;

    // Bytes already copied from chunk 0 must not hide the failure.
    let err = read_once(&mut r, 20000).unwrap_err();
    let err = err
        .into_inner()
        .and_then(|err| err.downcast::<Error>().ok())
        .expect("must carry s3store error");
    assert!(err.is_persistent());
    assert_eq!(err.context("offset"), Some("16384"));

    assert_eq!(acc.fetches(), 2);
    assert_eq!(acc.live_readers(), 0);
    assert_eq!(r.position(), 10000);

    // Nothing was consumed, the same read succeeds once the backend recovers.
    let bs = read_once(&mut r, 20000)?;
    assert_eq!(bs, content[10000..30000].to_vec());
    assert_eq!(acc.fetches(), 3);
    Ok(())
}

#[test]
fn test_failure_on_first_chunk() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);
    acc.fail_read(1);

    let mut r = store.open_resource("object")?;
    let mut bs = Vec::new();
    r.read_to_end(&mut bs)?;

    assert_eq!(bs, content.to_vec());
    assert_eq!(acc.fetches(), 2);
    Ok(())
}

#[test]
fn test_open_missing_object() -> Result<()> {
    let (acc, store, _) = fault_store(OBJECT_SIZE);

    let err = store.open_resource("missing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_reader_outlives_store() -> Result<()> {
    let (_, store, content) = fault_store(OBJECT_SIZE);
    let mut r = store.open_resource("object")?;
    drop(store);

    let mut bs = Vec::new();
    r.read_to_end(&mut bs)?;
    assert_eq!(bs, content.to_vec());
    Ok(())
}

#[test]
fn test_one_reader_per_thread() -> Result<()> {
    let (acc, store, content) = fault_store(OBJECT_SIZE);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut r = store.open_resource("object").expect("open must succeed");
                let mut bs = Vec::new();
                r.read_to_end(&mut bs).expect("read must succeed");
                assert_eq!(bs, content.to_vec());
            });
        }
    });

    assert_eq!(acc.fetches(), 4);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}

#[test]
fn test_session_chunks() -> Result<()> {
    let (acc, _, content) = fault_store(OBJECT_SIZE);
    let session = ObjectSession::new(std::sync::Arc::new(acc.clone()), BUCKET, "object", None);
    assert_eq!(session.total_bytes(), None);

    let chunk = session.chunk(32768, CHUNK_SIZE)?;
    assert_eq!(session.total_bytes(), Some(OBJECT_SIZE as u64));
    assert_eq!(chunk.offset(), 32768);
    assert_eq!(chunk.valid_bytes(), CHUNK_SIZE);

    let mut buf = vec![0; CHUNK_SIZE];
    assert_eq!(chunk.read_at(32768, &mut buf), CHUNK_SIZE);
    assert_eq!(buf, content[32768..32768 + CHUNK_SIZE].to_vec());

    // At or beyond the end is an empty chunk, not an error.
    let chunk = session.chunk(OBJECT_SIZE as u64, CHUNK_SIZE)?;
    assert!(chunk.is_empty());

    // Unranged open to learn the size, then the ranged reopen at 32768.
    assert_eq!(
        acc.fetch_ranges(),
        vec![BytesRange::default(), BytesRange::from(32768..50000)]
    );

    drop(session);
    assert_eq!(acc.live_readers(), 0);
    Ok(())
}
