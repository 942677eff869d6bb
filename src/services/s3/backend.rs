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

use std::fmt::Debug;
use std::fmt::Formatter;
use std::io::Read;
use std::sync::Arc;

use http::StatusCode;
use log::debug;
use reqsign::AwsCredential;
use reqsign::AwsV4Signer;

use super::config::S3Config;
use super::core::*;
use super::error::parse_error;
use crate::raw::*;
use crate::*;

const DEFAULT_REGION: &str = "us-east-1";

/// Aws S3 and compatible services (including minio, ceph and so on) support.
///
/// # Configuration
///
/// - `endpoint`: Set the endpoint for backend.
/// - `region`: Set the region for backend.
/// - `access_key_id`: Set the access_key_id for backend.
/// - `secret_access_key`: Set the secret_access_key for backend.
/// - `session_token`: Set the session_token for backend.
/// - `allow_anonymous`: Send requests without signing.
/// - `enable_virtual_host_style`: Address buckets as `{bucket}.{host}`.
///
/// Unset fields are loaded from the standard AWS environment variables by
/// [`S3Config::from_env`].
///
/// # Example
///
/// ```no_run
/// use s3store::services::S3Builder;
///
/// # fn main() -> s3store::Result<()> {
/// let mut builder = S3Builder::default();
/// builder
///     .endpoint("http://127.0.0.1:9000")
///     .region("us-east-1")
///     .access_key_id("minioadmin")
///     .secret_access_key("minioadmin");
///
/// let s3 = builder.build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct S3Builder {
    config: S3Config,
    http_client: Option<HttpClient>,
}

impl Debug for S3Builder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Builder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl S3Builder {
    /// Create a builder from config.
    pub fn from_config(config: S3Config) -> Self {
        S3Builder {
            config,
            http_client: None,
        }
    }

    /// Create a builder from the standard AWS environment variables.
    pub fn from_env() -> Self {
        Self::from_config(S3Config::from_env())
    }

    /// Set endpoint of this backend.
    ///
    /// If user inputs endpoint without scheme like "s3.amazonaws.com", we
    /// will prepend "https://" before it.
    pub fn endpoint(&mut self, endpoint: &str) -> &mut Self {
        if !endpoint.is_empty() {
            // Trim trailing `/` so that we can accept `http://127.0.0.1:9000/`
            self.config.endpoint = Some(endpoint.trim_end_matches('/').to_string())
        }

        self
    }

    /// Region represent the signing region of this endpoint.
    pub fn region(&mut self, region: &str) -> &mut Self {
        if !region.is_empty() {
            self.config.region = Some(region.to_string())
        }

        self
    }

    /// Set access_key_id of this backend.
    pub fn access_key_id(&mut self, v: &str) -> &mut Self {
        if !v.is_empty() {
            self.config.access_key_id = Some(v.to_string())
        }

        self
    }

    /// Set secret_access_key of this backend.
    pub fn secret_access_key(&mut self, v: &str) -> &mut Self {
        if !v.is_empty() {
            self.config.secret_access_key = Some(v.to_string())
        }

        self
    }

    /// Set session_token of this backend.
    pub fn session_token(&mut self, v: &str) -> &mut Self {
        if !v.is_empty() {
            self.config.session_token = Some(v.to_string())
        }

        self
    }

    /// Allow anonymous will allow s3store to send request without signing
    /// when credential is not set.
    pub fn allow_anonymous(&mut self) -> &mut Self {
        self.config.allow_anonymous = true;
        self
    }

    /// Enable virtual host style.
    pub fn enable_virtual_host_style(&mut self) -> &mut Self {
        self.config.enable_virtual_host_style = true;
        self
    }

    /// Specify the http client that used by this service.
    ///
    /// # Notes
    ///
    /// This API is part of s3store's Raw API. `HttpClient` could be changed
    /// during minor updates.
    pub fn http_client(&mut self, client: HttpClient) -> &mut Self {
        self.http_client = Some(client);
        self
    }

    /// Build the backend.
    pub fn build(&mut self) -> Result<S3> {
        debug!("backend build started: {:?}", &self);

        let region = self
            .config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        debug!("backend use region: {region}");

        let endpoint = match &self.config.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{region}.amazonaws.com"),
        };
        // Make sure the endpoint contains the scheme.
        let endpoint = if endpoint.starts_with("http") {
            endpoint
        } else {
            // Prefix https if endpoint doesn't start with scheme.
            format!("https://{endpoint}")
        };
        debug!("backend use endpoint: {endpoint}");

        let credential = match (&self.config.access_key_id, &self.config.secret_access_key) {
            (Some(ak), Some(sk)) => Some(AwsCredential {
                access_key_id: ak.clone(),
                secret_access_key: sk.clone(),
                session_token: self.config.session_token.clone(),
                ..Default::default()
            }),
            _ if self.config.allow_anonymous => None,
            _ => {
                return Err(Error::new(
                    ErrorKind::ConfigInvalid,
                    "no valid credential found and anonymous access is not allowed",
                )
                .with_operation("S3Builder::build")
                .with_context("service", "s3"))
            }
        };

        let client = match self.http_client.take() {
            Some(client) => client,
            None => HttpClient::new()?,
        };

        Ok(S3 {
            core: Arc::new(S3Core {
                endpoint,
                signer: AwsV4Signer::new("s3", &region),
                region,
                enable_virtual_host_style: self.config.enable_virtual_host_style,
                credential,
                client,
            }),
        })
    }
}

/// Backend for s3 services.
#[derive(Debug, Clone)]
pub struct S3 {
    core: Arc<S3Core>,
}

impl Access for S3 {
    fn info(&self) -> AccessorInfo {
        AccessorInfo::new("s3").with_name(&self.core.endpoint)
    }

    fn fetch(&self, bucket: &str, key: &str, args: OpFetch) -> Result<(RpFetch, FetchReader)> {
        let resp = self.core.s3_get_object(bucket, key, &args)?;

        match resp.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => {
                let content_length = parse_content_length(resp.headers())?.ok_or_else(|| {
                    Error::new(ErrorKind::Unexpected, "response has no content length")
                        .with_operation("S3::fetch")
                        .with_context("key", key)
                })?;

                Ok((RpFetch::new(content_length), Box::new(resp.into_body())))
            }
            _ => Err(parse_error(parse_error_response(resp)?)),
        }
    }

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        args: OpUpload,
        body: &mut dyn Read,
    ) -> Result<RpUpload> {
        let resp = self.core.s3_put_object(bucket, key, &args, body)?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let mut rp = RpUpload::new();
                if let Some(v) = parse_header_to_str(resp.headers(), constants::X_AMZ_REQUEST_ID)? {
                    rp = rp.with_request_id(v);
                }
                resp.into_body().consume()?;
                Ok(rp)
            }
            _ => Err(parse_error(parse_error_response(resp)?)),
        }
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let resp = self.core.s3_delete_object(bucket, key)?;

        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            // Allow 404 when deleting a non-existing object.
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(parse_error(parse_error_response(resp)?)),
        }
    }
}
