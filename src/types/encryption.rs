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
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::OnceLock;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use md5::Digest;
use rand::RngCore;

use crate::*;

/// CustomerKey is the symmetric key material sent along every request of a
/// store using [`EncryptionMode::CustomerProvided`].
///
/// The key is kept in its wire form: the base64 encoded key and the base64
/// encoded MD5 of the raw key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomerKey {
    key: String,
    key_md5: String,
}

/// Never print key material.
impl Debug for CustomerKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerKey")
            .field("key_md5", &self.key_md5)
            .finish_non_exhaustive()
    }
}

static PROCESS_KEY: OnceLock<Arc<CustomerKey>> = OnceLock::new();

impl CustomerKey {
    /// Build a key from 32 raw bytes (AES-256).
    pub fn from_bytes(raw: [u8; 32]) -> Self {
        let mut hasher = md5::Md5::new();
        hasher.update(raw);

        CustomerKey {
            key: BASE64_STANDARD.encode(raw),
            key_md5: BASE64_STANDARD.encode(hasher.finalize()),
        }
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        Self::from_bytes(raw)
    }

    /// The process-wide key.
    ///
    /// Generated on the first call and shared read-only by every store of
    /// this process afterwards. Objects written with it can only be read
    /// back by the same process.
    pub fn process() -> Arc<CustomerKey> {
        PROCESS_KEY
            .get_or_init(|| Arc::new(CustomerKey::generate()))
            .clone()
    }

    /// Base64 encoded key.
    pub fn key_base64(&self) -> &str {
        &self.key
    }

    /// Base64 encoded MD5 digest of the raw key.
    pub fn key_md5_base64(&self) -> &str {
        &self.key_md5
    }
}

/// ServerSideEncryption carries the encryption directives a backend must
/// attach to requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerSideEncryption {
    /// Ask the backend to encrypt with keys it manages. Only applies to
    /// uploads.
    ServerManaged,
    /// Send the customer key with every upload and fetch.
    CustomerProvided(Arc<CustomerKey>),
}

impl EncryptionMode {
    /// Resolve the encryption directives for this mode.
    ///
    /// # Errors
    ///
    /// [`EncryptionMode::KeyManaged`] is not supported and returns
    /// [`ErrorKind::ConfigInvalid`] instead of silently downgrading.
    pub fn server_side_encryption(
        &self,
        key: &Arc<CustomerKey>,
    ) -> Result<Option<ServerSideEncryption>> {
        match self {
            EncryptionMode::None => Ok(None),
            EncryptionMode::ServerManaged => Ok(Some(ServerSideEncryption::ServerManaged)),
            EncryptionMode::CustomerProvided => {
                Ok(Some(ServerSideEncryption::CustomerProvided(key.clone())))
            }
            EncryptionMode::KeyManaged => Err(Error::new(
                ErrorKind::ConfigInvalid,
                "key managed encryption is not supported",
            )
            .with_operation("EncryptionMode::server_side_encryption")
            .with_context("scheme", self.scheme())),
        }
    }
}
