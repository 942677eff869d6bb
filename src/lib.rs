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

//! s3store turns remote objects into local-looking, seekable streams.
//!
//! A remote object store only offers forward-only range fetches over a
//! transport that can fail at any read. s3store buffers those fetches into
//! fixed-size chunks so that small sequential reads never hit the network,
//! repositions the fetch when a caller seeks, and absorbs a single transient
//! failure by reopening the fetch once.
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//! use std::io::Seek;
//! use std::io::SeekFrom;
//!
//! use s3store::services::Memory;
//! use s3store::ResourceStore;
//! use s3store::StoreOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ResourceStore::with_accessor("s3://bucket/data/", Memory::default(), StoreOptions::default())?;
//!
//! let mut source = std::io::Cursor::new(b"Hello, World!".to_vec());
//! store.write_resource(&mut source, None, "hello.txt")?;
//!
//! let mut r = store.open_resource("hello.txt")?;
//! r.seek(SeekFrom::Start(7))?;
//! let mut s = String::new();
//! r.read_to_string(&mut s)?;
//! assert_eq!(s, "World!");
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod types;
pub use types::*;

pub mod layers;
pub mod raw;
pub mod services;
