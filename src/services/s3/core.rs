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
use std::io::Read;

use http::header::CONTENT_LENGTH;
use http::header::HOST;
use http::header::RANGE;
use http::HeaderName;
use http::HeaderValue;
use http::Request;
use http::Response;
use reqsign::AwsCredential;
use reqsign::AwsV4Signer;

use crate::raw::*;
use crate::*;

pub mod constants {
    pub const X_AMZ_SERVER_SIDE_ENCRYPTION: &str = "x-amz-server-side-encryption";
    pub const X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_ALGORITHM: &str =
        "x-amz-server-side-encryption-customer-algorithm";
    pub const X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_KEY: &str =
        "x-amz-server-side-encryption-customer-key";
    pub const X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_KEY_MD5: &str =
        "x-amz-server-side-encryption-customer-key-md5";

    pub const X_AMZ_REQUEST_ID: &str = "x-amz-request-id";
    pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";

    pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

    pub const CONTENT_MD5: &str = "content-md5";

    pub const AES256: &str = "AES256";
}

pub struct S3Core {
    pub endpoint: String,
    pub region: String,
    pub enable_virtual_host_style: bool,

    pub signer: AwsV4Signer,
    pub credential: Option<AwsCredential>,
    pub client: HttpClient,
}

impl Debug for S3Core {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Core")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("enable_virtual_host_style", &self.enable_virtual_host_style)
            .finish_non_exhaustive()
    }
}

impl S3Core {
    /// Sign the request if credential is set, anonymous requests are sent
    /// as is.
    pub fn sign<T>(&self, req: &mut Request<T>) -> Result<()> {
        let cred = if let Some(cred) = &self.credential {
            cred
        } else {
            return Ok(());
        };

        // Bodies are streamed, never hashed.
        req.headers_mut()
            .entry(constants::X_AMZ_CONTENT_SHA_256)
            .or_insert(HeaderValue::from_static(constants::UNSIGNED_PAYLOAD));

        self.signer
            .sign(req, cred)
            .map_err(new_request_sign_error)?;

        // Always remove host header, let the http client set it.
        req.headers_mut().remove(HOST);

        Ok(())
    }

    #[inline]
    pub fn send(&self, req: Request<Body<'_>>) -> Result<Response<IncomingBody>> {
        self.client.send(req)
    }

    /// Build the url of an object.
    ///
    /// Path style: `{endpoint}/{bucket}/{key}`, virtual host style:
    /// `{scheme}://{bucket}.{host}/{key}`.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        let key = percent_encode_path(key);

        if !self.enable_virtual_host_style {
            return format!("{}/{}/{}", self.endpoint, bucket, key);
        }

        match self.endpoint.split_once("://") {
            Some((scheme, host)) => format!("{scheme}://{bucket}.{host}/{key}"),
            None => format!("https://{}.{}/{}", bucket, self.endpoint, key),
        }
    }

    /// # Note
    ///
    /// header like X_AMZ_SERVER_SIDE_ENCRYPTION doesn't need to set while
    /// get, but customer key headers must be sent on every request.
    pub fn insert_sse_headers(
        &self,
        mut req: http::request::Builder,
        sse: Option<&ServerSideEncryption>,
        is_write: bool,
    ) -> Result<http::request::Builder> {
        match sse {
            None => {}
            Some(ServerSideEncryption::ServerManaged) => {
                if is_write {
                    req = req.header(
                        HeaderName::from_static(constants::X_AMZ_SERVER_SIDE_ENCRYPTION),
                        HeaderValue::from_static(constants::AES256),
                    );
                }
            }
            Some(ServerSideEncryption::CustomerProvided(key)) => {
                req = req.header(
                    HeaderName::from_static(
                        constants::X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_ALGORITHM,
                    ),
                    HeaderValue::from_static(constants::AES256),
                );

                let mut v = build_header_value(key.key_base64())?;
                v.set_sensitive(true);
                req = req.header(
                    HeaderName::from_static(constants::X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_KEY),
                    v,
                );

                let mut v = build_header_value(key.key_md5_base64())?;
                v.set_sensitive(true);
                req = req.header(
                    HeaderName::from_static(
                        constants::X_AMZ_SERVER_SIDE_ENCRYPTION_CUSTOMER_KEY_MD5,
                    ),
                    v,
                );
            }
        }

        Ok(req)
    }

    pub fn s3_get_object_request(
        &self,
        bucket: &str,
        key: &str,
        args: &OpFetch,
    ) -> Result<Request<Body<'static>>> {
        let url = self.object_url(bucket, key);

        let mut req = Request::get(&url);

        let range = args.range();
        if !range.is_full() {
            req = req.header(RANGE, range.to_header());
        }

        req = self.insert_sse_headers(req, args.server_side_encryption(), false)?;

        req.body(Body::Empty).map_err(new_request_build_error)
    }

    pub fn s3_get_object(
        &self,
        bucket: &str,
        key: &str,
        args: &OpFetch,
    ) -> Result<Response<IncomingBody>> {
        let mut req = self.s3_get_object_request(bucket, key, args)?;

        self.sign(&mut req)?;

        self.send(req)
    }

    pub fn s3_put_object_request<'a>(
        &self,
        bucket: &str,
        key: &str,
        args: &OpUpload,
        body: &'a mut dyn Read,
    ) -> Result<Request<Body<'a>>> {
        let url = self.object_url(bucket, key);

        let mut req = Request::put(&url)
            .header(CONTENT_LENGTH, args.content_length())
            .header(constants::CONTENT_MD5, args.content_digest().to_base64());

        // Set SSE headers.
        req = self.insert_sse_headers(req, args.server_side_encryption(), true)?;

        req.body(Body::Reader(body))
            .map_err(new_request_build_error)
    }

    pub fn s3_put_object(
        &self,
        bucket: &str,
        key: &str,
        args: &OpUpload,
        body: &mut dyn Read,
    ) -> Result<Response<IncomingBody>> {
        let mut req = self.s3_put_object_request(bucket, key, args, body)?;

        self.sign(&mut req)?;

        self.send(req)
    }

    pub fn s3_delete_object(&self, bucket: &str, key: &str) -> Result<Response<IncomingBody>> {
        let url = self.object_url(bucket, key);

        let mut req = Request::delete(&url)
            .body(Body::Empty)
            .map_err(new_request_build_error)?;

        self.sign(&mut req)?;

        self.send(req)
    }
}

fn build_header_value(v: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(v).map_err(|e| {
        Error::new(ErrorKind::ConfigInvalid, "header value contains invalid characters")
            .with_operation("http_util::build_header_value")
            .set_source(e)
    })
}
