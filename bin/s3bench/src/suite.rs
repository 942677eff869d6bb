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

use std::io::Read;
use std::time::Instant;

use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use s3store::ResourceStore;
use uuid::Uuid;

use crate::random::RandomSource;
use crate::report::PhaseReport;
use crate::report::Report;

pub struct BenchSuite {
    pub store: ResourceStore,
    pub files: u32,
    pub bytes_per_file: u64,
    pub read_buffer: usize,
    pub seed: u32,
    pub cleanup: bool,
}

/// A file written by the write phase.
#[derive(Debug)]
struct Written {
    name: String,
    size: u64,
}

impl BenchSuite {
    pub fn run(self) -> Result<Report> {
        println!("Start running bench suite on {} ...", self.store.location());

        let (written, write) = self.write_phase()?;
        let read = self.read_phase(&written)?;

        if self.cleanup {
            for file in &written {
                self.store.delete_resource(&file.name);
            }
            debug!("deleted {} files", written.len());
        }

        Ok(Report::new(self.files, self.bytes_per_file, write, read))
    }

    /// Size of every file, between half and one and a half of
    /// `bytes_per_file`.
    fn file_sizes(&self) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(self.seed as u64);
        let b = self.bytes_per_file;

        (0..self.files)
            .map(|_| b - b / 2 + rng.gen_range(0..b))
            .collect()
    }

    fn write_phase(&self) -> Result<(Vec<Written>, PhaseReport)> {
        let mut report = PhaseReport::default();
        let mut written = Vec::with_capacity(self.files as usize);

        for (idx, size) in self.file_sizes().into_iter().enumerate() {
            let mut source = RandomSource::new(self.seed.wrapping_add(idx as u32), size);
            let name = Uuid::new_v4().simple().to_string();

            let elapsed = self
                .store
                .write_resource(&mut source, None, &name)
                .with_context(|| format!("failed to write {name}"))?;
            println!("Write Latency: {}us", elapsed.as_micros());

            report.add(source.len(), elapsed);
            written.push(Written { name, size });
        }

        Ok((written, report))
    }

    fn read_phase(&self, written: &[Written]) -> Result<PhaseReport> {
        let mut report = PhaseReport::default();
        let mut buf = vec![0; self.read_buffer];

        for file in written {
            let start = Instant::now();
            let mut r = self
                .store
                .open_resource(&file.name)
                .with_context(|| format!("failed to open {}", file.name))?;

            let mut total = 0u64;
            loop {
                let n = r
                    .read(&mut buf)
                    .with_context(|| format!("failed to read {} at {}", file.name, total))?;
                if n == 0 {
                    break;
                }
                total += n as u64;
            }
            let elapsed = start.elapsed();
            println!("Read Latency: {}us", elapsed.as_micros());

            ensure!(
                total == file.size,
                "{} returned {} bytes, expected {}",
                file.name,
                total,
                file.size
            );
            report.add(total, elapsed);
        }

        Ok(report)
    }
}
