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

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use crate::*;

/// EncryptionMode is the server side encryption policy selected by the
/// scheme of a location string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncryptionMode {
    /// `s3://`: objects are stored without encryption.
    None,
    /// `s3e://`: the backend encrypts with keys it manages itself.
    ServerManaged,
    /// `s3k://`: the backend encrypts with a key from a key management
    /// service.
    ///
    /// Recognized but not supported: building a store with it fails.
    KeyManaged,
    /// `s3x://`: the caller supplies the key material on every request.
    CustomerProvided,
}

impl EncryptionMode {
    /// The scheme token (without `://`) for this mode.
    pub fn scheme(&self) -> &'static str {
        match self {
            EncryptionMode::None => "s3",
            EncryptionMode::ServerManaged => "s3e",
            EncryptionMode::KeyManaged => "s3k",
            EncryptionMode::CustomerProvided => "s3x",
        }
    }

    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "s3" => Some(EncryptionMode::None),
            "s3e" => Some(EncryptionMode::ServerManaged),
            "s3k" => Some(EncryptionMode::KeyManaged),
            "s3x" => Some(EncryptionMode::CustomerProvided),
            _ => None,
        }
    }
}

impl Display for EncryptionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheme())
    }
}

/// StoreLocation is a parsed location string of the form
/// `<scheme>://<empty-host>/<bucket>/<prefix...>`.
///
/// ```
/// use s3store::EncryptionMode;
/// use s3store::StoreLocation;
///
/// let loc: StoreLocation = "s3x://mybucket/data/".parse().unwrap();
/// assert_eq!(loc.bucket(), "mybucket");
/// assert_eq!(loc.prefix(), "data/");
/// assert_eq!(loc.encryption(), EncryptionMode::CustomerProvided);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreLocation {
    encryption: EncryptionMode,
    bucket: String,
    prefix: String,
}

impl StoreLocation {
    /// Encryption mode selected by the scheme.
    pub fn encryption(&self) -> EncryptionMode {
        self.encryption
    }

    /// Bucket name, never empty.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Normalized key prefix.
    ///
    /// Either empty or ending with exactly one `/`; never starts with `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Display for StoreLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.encryption, self.bucket, self.prefix)
    }
}

impl FromStr for StoreLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &'static str| {
            Error::new(ErrorKind::ConfigInvalid, reason)
                .with_operation("StoreLocation::from_str")
                .with_context("location", s)
        };

        let parts = s.split('/').collect::<Vec<_>>();
        if parts.len() < 3 {
            return Err(invalid("location must look like <scheme>://<bucket>/<prefix>"));
        }

        let encryption = parts[0]
            .strip_suffix(':')
            .and_then(EncryptionMode::from_scheme)
            .ok_or_else(|| invalid("location scheme is not a known store scheme"))?;

        if !parts[1].is_empty() {
            return Err(invalid("location host must be empty"));
        }

        let bucket = parts[2];
        if bucket.is_empty() {
            return Err(invalid("location bucket is missing"));
        }

        let prefix = normalize_prefix(&parts[3..].join("/"));
        if prefix.starts_with('/') {
            return Err(invalid("location prefix must not start with a separator"));
        }

        Ok(StoreLocation {
            encryption,
            bucket: bucket.to_string(),
            prefix,
        })
    }
}

/// Normalize a key prefix so that it ends with exactly one `/`.
///
/// Backslashes are treated as separators. An empty prefix stays empty so
/// that keys can live at the bucket root.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let p = prefix.replace('\\', "/");
    let p = p.trim_end_matches('/');
    if p.is_empty() {
        return String::new();
    }

    format!("{p}/")
}
