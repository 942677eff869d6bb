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

//! s3bench writes synthetic files to a store and reads them back, reporting
//! latency and throughput of both phases.

mod random;
mod report;
mod suite;

use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use s3store::services::Memory;
use s3store::services::S3Builder;
use s3store::ResourceStore;
use s3store::StoreOptions;

use crate::suite::BenchSuite;

#[derive(Debug, Parser)]
#[command(about, version)]
struct Args {
    /// Target folder, like `s3://my_bucket_name/myobjectkey`.
    ///
    /// `s3://` uses no encryption, `s3e://` uses SSE-S3, `s3x://` uses
    /// SSE-C with a key generated for this run. `s3k://` (SSE-KMS) is
    /// recognized but not supported.
    target_location: String,
    /// Number of files to write and then read.
    files: u32,
    /// Average number of bytes per file.
    ///
    /// The actual size varies randomly between half this number and 50% more.
    bytes_per_file: u64,
    /// Size of the chunk fetched from the backend on every refill.
    #[arg(long, default_value_t = 16384)]
    chunk_size: usize,
    /// Size of the buffer used by each read call.
    #[arg(long, default_value_t = 8192)]
    read_buffer: usize,
    /// Delete the written files at the end.
    #[arg(long)]
    cleanup: bool,
    /// Run against an in-process backend instead of s3.
    #[arg(long)]
    memory: bool,
    /// Seed of the payload generator and of the file sizes.
    #[arg(long, default_value_t = 0)]
    seed: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    ensure!(args.files > 0, "files must be greater than zero");
    ensure!(
        args.bytes_per_file > 0,
        "bytes_per_file must be greater than zero"
    );
    ensure!(args.read_buffer > 0, "read_buffer must be greater than zero");

    let options = StoreOptions::default().with_chunk_size(args.chunk_size);
    let store = if args.memory {
        ResourceStore::with_accessor(&args.target_location, Memory::default(), options)
    } else {
        let s3 = S3Builder::from_env()
            .build()
            .context("failed to build s3 service from env")?;
        ResourceStore::with_accessor(&args.target_location, s3, options)
    }
    .with_context(|| format!("invalid target location {}", args.target_location))?;

    let suite = BenchSuite {
        store,
        files: args.files,
        bytes_per_file: args.bytes_per_file,
        read_buffer: args.read_buffer,
        seed: args.seed,
        cleanup: args.cleanup,
    };
    let report = suite.run()?;
    println!("{report}");

    Ok(())
}
