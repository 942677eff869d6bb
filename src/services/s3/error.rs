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

use bytes::Buf;
use quick_xml::de;
use serde::Deserialize;

use crate::raw::*;
use crate::*;

/// S3Error is the error returned by s3 service.
#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "PascalCase")]
pub(super) struct S3Error {
    pub code: String,
    pub message: String,
    pub resource: String,
    pub request_id: String,
    pub host_id: String,
}

/// Parse error response into Error.
///
/// The `code`, `request_id` and `host_id` reported by s3 are kept verbatim
/// in the error context.
pub(super) fn parse_error(resp: ErrorResponse) -> Error {
    let (mut kind, mut retryable) = match resp.status_code().as_u16() {
        403 => (ErrorKind::PermissionDenied, false),
        404 => (ErrorKind::NotFound, false),
        // Service like R2 could return 499 error with a message like:
        // Client Disconnect, we should retry it.
        499 => (ErrorKind::Unexpected, true),
        500 | 502 | 503 | 504 => (ErrorKind::Unexpected, true),
        _ => (ErrorKind::Unexpected, false),
    };

    let (message, s3_err) = de::from_reader::<_, S3Error>(resp.body().reader())
        .map(|s3_err| (s3_err.message.clone(), Some(s3_err)))
        .unwrap_or_else(|_| (String::from_utf8_lossy(resp.body()).into_owned(), None));

    if let Some(s3_err) = &s3_err {
        (kind, retryable) = parse_s3_error_code(s3_err.code.as_str()).unwrap_or((kind, retryable));
    }

    let mut err = with_error_response_context(Error::new(kind, message), &resp);

    if let Some(s3_err) = s3_err {
        if !s3_err.code.is_empty() {
            err = err.with_context("code", s3_err.code);
        }
        if err.context("request_id").is_none() && !s3_err.request_id.is_empty() {
            err = err.with_context("request_id", s3_err.request_id);
        }
        if err.context("host_id").is_none() && !s3_err.host_id.is_empty() {
            err = err.with_context("host_id", s3_err.host_id);
        }
    }

    if retryable {
        err = err.set_temporary();
    }

    err
}

/// Returns the `Error kind` of this code and whether the error is retryable.
/// All possible error code: <https://docs.aws.amazon.com/AmazonS3/latest/API/ErrorResponses.html#ErrorCodeList>
fn parse_s3_error_code(code: &str) -> Option<(ErrorKind, bool)> {
    match code {
        // > The specified bucket does not exist.
        //
        // Although the status code is 404, NoSuchBucket is
        // a config invalid error, and it's not retryable.
        "NoSuchBucket" => Some((ErrorKind::ConfigInvalid, false)),
        // > Your socket connection to the server was not read from
        // > or written to within the timeout period."
        "RequestTimeout" => Some((ErrorKind::Unexpected, true)),
        // > An internal error occurred. Try again.
        "InternalError" => Some((ErrorKind::Unexpected, true)),
        // > Please reduce your request rate.
        "SlowDown" => Some((ErrorKind::RateLimited, true)),
        // > Service is unable to handle request.
        "ServiceUnavailable" => Some((ErrorKind::Unexpected, true)),
        _ => None,
    }
}
