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

use http::Request;
use http::Response;
use log::debug;

use crate::raw::*;
use crate::*;

/// HttpClient that used across s3store.
#[derive(Clone)]
pub struct HttpClient {
    client: ureq::Agent,
}

/// We don't want users to know details about our clients.
impl Debug for HttpClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish()
    }
}

impl HttpClient {
    /// Create a new http client.
    pub fn new() -> Result<Self> {
        // Redirect will be handled by ourselves.
        let mut builder = ureq::AgentBuilder::new().redirects(0);

        for key in ["http_proxy", "https_proxy", "HTTP_PROXY", "HTTPS_PROXY"] {
            if let Ok(proxy) = env::var(key) {
                // Ignore proxy setting if proxy is invalid.
                if let Ok(proxy) = ureq::Proxy::new(proxy) {
                    debug!("http client: set proxy to {proxy:?}");
                    builder = builder.proxy(proxy);
                }
            }
        }

        Ok(HttpClient {
            client: builder.build(),
        })
    }

    /// Build a new http client from an already built agent.
    ///
    /// # Notes
    ///
    /// By using this method, it's caller's duty to make sure everything
    /// configured correctly, like the redirect count which must be `0`:
    ///
    /// ```no_run
    /// # fn main() {
    /// let _client = ureq::AgentBuilder::new().redirects(0).build();
    /// # }
    /// ```
    pub fn with_client(client: ureq::Agent) -> Self {
        Self { client }
    }

    /// Send a request in blocking way.
    ///
    /// Responses with non-2xx status are returned as is, services decide
    /// how to parse them. Only transport failures become errors.
    pub fn send(&self, req: Request<Body<'_>>) -> Result<Response<IncomingBody>> {
        let (parts, body) = req.into_parts();

        let mut ur = self
            .client
            .request(parts.method.as_str(), &parts.uri.to_string());
        for (k, v) in parts.headers.iter() {
            let v = v.to_str().map_err(|err| {
                Error::new(ErrorKind::Unexpected, "header value must be valid string")
                    .with_operation("http_util::Client::send")
                    .with_context("header_name", k.as_str())
                    .set_source(err)
            })?;
            ur = ur.set(k.as_str(), v);
        }

        let result = match body {
            Body::Empty => ur.call(),
            Body::Bytes(bs) => ur.send_bytes(&bs),
            Body::Reader(r) => ur.send(r),
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_code, resp)) => resp,
            Err(ureq::Error::Transport(transport)) => {
                return Err(new_request_send_error(transport));
            }
        };

        let mut hr = Response::builder().status(resp.status());
        for name in resp.headers_names() {
            if let Some(value) = resp.header(&name) {
                hr = hr.header(name.as_str(), value);
            }
        }

        hr.body(IncomingBody::new(resp.into_reader()))
            .map_err(|err| {
                Error::new(ErrorKind::Unexpected, "building http response")
                    .with_operation("http_util::Client::send")
                    .set_source(err)
            })
    }
}
