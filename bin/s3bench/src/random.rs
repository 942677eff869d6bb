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

/// RandomSource is a seekable stream of deterministic pseudo-random bytes.
///
/// The byte at position `p` only depends on `seed + p`, so the same content
/// is produced again after a seek.
#[derive(Debug, Clone)]
pub struct RandomSource {
    seed: u32,
    pos: u64,
    len: u64,
}

impl RandomSource {
    pub fn new(seed: u32, len: u64) -> Self {
        Self { seed, pos: 0, len }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    fn byte_at(&self, pos: u64) -> u8 {
        mwc(self.seed.wrapping_add(pos as u32)) as u8
    }
}

/// One step of Marsaglia's multiply-with-carry generator on 16-bit halves.
fn mwc(seed: u32) -> u32 {
    let z = ((seed >> 16) as u16).wrapping_mul(36969);
    let w = (seed as u16).wrapping_mul(18000);
    ((z as u32) << 16) + w as u32
}

impl Read for RandomSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len - self.pos;
        let n = (buf.len() as u64).min(remaining) as usize;

        for (i, b) in buf[..n].iter_mut().enumerate() {
            *b = self.byte_at(self.pos + i as u64);
        }
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for RandomSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(n) => (n as i128, 0),
            SeekFrom::End(n) => (self.len as i128, n as i128),
            SeekFrom::Current(n) => (self.pos as i128, n as i128),
        };

        let target = base + offset;
        if target < 0 || target > self.len as i128 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {target} is outside of [0, {}]", self.len),
            ));
        }

        self.pos = target as u64;
        Ok(self.pos)
    }
}
