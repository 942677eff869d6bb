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

use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Duration;

/// Report of a whole run: one [`PhaseReport`] per phase plus the plain
/// average lines.
#[derive(Debug)]
pub struct Report {
    files: u32,
    bytes_per_file: u64,
    write: PhaseReport,
    read: PhaseReport,
}

impl Report {
    pub fn new(files: u32, bytes_per_file: u64, write: PhaseReport, read: PhaseReport) -> Self {
        Self {
            files,
            bytes_per_file,
            write,
            read,
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Files: {}", self.files)?;
        writeln!(
            f,
            "Bytes per file: {}",
            humansize::format_size(self.bytes_per_file, humansize::BINARY)
        )?;

        writeln!(f)?;
        writeln!(f, "Write:")?;
        writeln!(f, "{}", self.write)?;

        writeln!(f)?;
        writeln!(f, "Read:")?;
        writeln!(f, "{}", self.read)?;

        writeln!(f)?;
        writeln!(
            f,
            "Average Write Latency: {}us",
            self.write.average_latency_micros()
        )?;
        writeln!(
            f,
            "Average Read Latency: {}us",
            self.read.average_latency_micros()
        )?;
        writeln!(f, "Average Write KB/sec: {}", self.write.kb_per_sec())?;
        write!(f, "Average Read KB/sec: {}", self.read.kb_per_sec())?;

        Ok(())
    }
}

/// Samples and totals collected by one phase.
#[derive(Debug, Default)]
pub struct PhaseReport {
    count: u64,
    total_bytes: u64,
    total_micros: u64,
    latency: SampleSet,
    bandwidth: SampleSet,
}

impl PhaseReport {
    /// Record one file of `bytes` that took `elapsed`.
    pub fn add(&mut self, bytes: u64, elapsed: Duration) {
        let micros = elapsed.as_micros() as u64;

        self.count += 1;
        self.total_bytes += bytes;
        self.total_micros += micros;
        self.latency.add(micros as f64);
        if elapsed > Duration::ZERO {
            self.bandwidth.add(bytes as f64 / elapsed.as_secs_f64());
        }
    }

    fn average_latency_micros(&self) -> u64 {
        self.total_micros.checked_div(self.count).unwrap_or_default()
    }

    /// Bytes per millisecond, which is what the plain average line has
    /// always printed as KB/sec.
    fn kb_per_sec(&self) -> u64 {
        (self.total_bytes * 1000)
            .checked_div(self.total_micros)
            .unwrap_or_default()
    }
}

impl Display for PhaseReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "  Total: {}",
            humansize::format_size(self.total_bytes, humansize::BINARY)
        )?;

        writeln!(f, "  Bandwidth:")?;
        writeln!(
            f,
            "{}/s",
            self.bandwidth.to_metric().format(4, |x| {
                humansize::format_size_i(x, humansize::BINARY).to_string()
            })
        )?;

        writeln!(f, "  Latency:")?;
        write!(
            f,
            "{}",
            self.latency.to_metric().format(4, |x| {
                let dur = Duration::from_micros(x as u64);
                humantime::format_duration(dur).to_string()
            })
        )?;

        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct Metric {
    count: u32,
    min: f64,
    max: f64,
    avg: f64,
    stddev: f64,
    p99: f64,
    p95: f64,
    p50: f64,
}

impl Metric {
    fn format(&self, indent: usize, formatter: fn(f64) -> String) -> String {
        format!(
            "{:indent$}count: {}\n\
             {:indent$}min: {}\n\
             {:indent$}max: {}\n\
             {:indent$}avg: {}\n\
             {:indent$}stddev: {}\n\
             {:indent$}p99: {}\n\
             {:indent$}p95: {}\n\
             {:indent$}p50: {}",
            "",
            self.count,
            "",
            formatter(self.min),
            "",
            formatter(self.max),
            "",
            formatter(self.avg),
            "",
            formatter(self.stddev),
            "",
            formatter(self.p99),
            "",
            formatter(self.p95),
            "",
            formatter(self.p50),
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct SampleSet {
    values: Vec<f64>,
}

impl SampleSet {
    /// Add a new sample value.
    pub fn add(&mut self, sample: f64) {
        assert!(sample.is_finite(), "sample value must be finite");
        self.values.push(sample);
    }

    fn min(&self) -> Option<f64> {
        self.values.iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    fn max(&self) -> Option<f64> {
        self.values.iter().copied().max_by(|a, b| a.total_cmp(b))
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn avg(&self) -> Option<f64> {
        let count = self.count();
        if count == 0 {
            return None;
        }

        let sum: f64 = self.values.iter().copied().sum();
        Some(sum / (count as f64))
    }

    /// Population standard deviation.
    fn stddev(&self) -> Option<f64> {
        let avg = self.avg()?;
        let sum = self
            .values
            .iter()
            .copied()
            .map(|x| (x - avg).powi(2))
            .sum::<f64>();
        Some((sum / self.count() as f64).sqrt())
    }

    /// Get the percentile value.
    ///
    /// The percentile value must between 0.0 and 100.0 (both inclusive).
    fn percentile(&self, percentile: f64) -> Option<f64> {
        assert!(
            (0.0..=100.0).contains(&percentile),
            "percentile must be between 0.0 and 100.0"
        );

        let count = self.count();
        if count == 0 {
            return None;
        }

        let index = ((count - 1) as f64 * percentile / 100.0).trunc() as usize;
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.get(index).copied()
    }

    fn to_metric(&self) -> Metric {
        Metric {
            count: self.count() as u32,
            min: self.min().unwrap_or(f64::NAN),
            max: self.max().unwrap_or(f64::NAN),
            avg: self.avg().unwrap_or(f64::NAN),
            stddev: self.stddev().unwrap_or(f64::NAN),
            p99: self.percentile(99.0).unwrap_or(f64::NAN),
            p95: self.percentile(95.0).unwrap_or(f64::NAN),
            p50: self.percentile(50.0).unwrap_or(f64::NAN),
        }
    }
}
