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

use std::env;
use std::fmt::Debug;
use std::fmt::Formatter;

use serde::Deserialize;

/// Config for Aws S3 and compatible services (minio, ceph and so on).
///
/// The bucket is not part of the config: it comes from the location of the
/// store.
#[derive(Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
#[non_exhaustive]
pub struct S3Config {
    /// endpoint of this backend.
    ///
    /// Endpoint must be full uri, e.g.
    ///
    /// - AWS S3: `https://s3.amazonaws.com` or `https://s3.{region}.amazonaws.com`
    /// - Minio: `http://127.0.0.1:9000`
    ///
    /// If user inputs endpoint without scheme like "s3.amazonaws.com", we
    /// will prepend "https://" before it.
    ///
    /// default to `https://s3.{region}.amazonaws.com` if not set.
    #[serde(alias = "aws_endpoint", alias = "aws_endpoint_url", alias = "endpoint_url")]
    pub endpoint: Option<String>,
    /// Region represent the signing region of this endpoint.
    ///
    /// default to `us-east-1` if not set.
    #[serde(alias = "aws_region")]
    pub region: Option<String>,
    /// access_key_id of this backend.
    #[serde(alias = "aws_access_key_id")]
    pub access_key_id: Option<String>,
    /// secret_access_key of this backend.
    #[serde(alias = "aws_secret_access_key")]
    pub secret_access_key: Option<String>,
    /// session_token (aka, security token) of this backend.
    #[serde(alias = "aws_session_token", alias = "aws_token", alias = "token")]
    pub session_token: Option<String>,
    /// Allow anonymous will allow s3store to send request without signing
    /// when credential is not set.
    pub allow_anonymous: bool,
    /// Enable virtual host style so that requests are sent to
    /// `https://{bucket}.{host}` instead of `https://{host}/{bucket}`.
    pub enable_virtual_host_style: bool,
}

impl Debug for S3Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("allow_anonymous", &self.allow_anonymous)
            .field("enable_virtual_host_style", &self.enable_virtual_host_style)
            .finish_non_exhaustive()
    }
}

impl S3Config {
    /// Load config from the standard AWS environment variables.
    pub fn from_env() -> Self {
        Self::default().load_env(|k| env::var(k).ok())
    }

    /// Fill the unset fields from `get`.
    pub(super) fn load_env(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| get(k).filter(|v| !v.is_empty());

        if self.endpoint.is_none() {
            self.endpoint = get("AWS_ENDPOINT_URL");
        }
        if self.region.is_none() {
            self.region = get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION"));
        }
        if self.access_key_id.is_none() {
            self.access_key_id = get("AWS_ACCESS_KEY_ID");
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = get("AWS_SECRET_ACCESS_KEY");
        }
        if self.session_token.is_none() {
            self.session_token = get("AWS_SESSION_TOKEN");
        }
        self
    }
}
