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

use http::header::CONTENT_LENGTH;
use http::HeaderMap;
use http::HeaderName;

use crate::*;

/// Parse content length from header map.
pub fn parse_content_length(headers: &HeaderMap) -> Result<Option<u64>> {
    parse_header_to_str(headers, CONTENT_LENGTH)?
        .map(|v| {
            v.parse::<u64>().map_err(|e| {
                Error::new(ErrorKind::Unexpected, "header value is not valid integer")
                    .set_source(e)
            })
        })
        .transpose()
}

/// Parse header value to string according to name.
#[inline]
pub fn parse_header_to_str<K>(headers: &HeaderMap, name: K) -> Result<Option<&str>>
where
    HeaderName: TryFrom<K>,
{
    let name = HeaderName::try_from(name).map_err(|_| {
        Error::new(
            ErrorKind::Unexpected,
            "header name must be valid http header name but not",
        )
        .with_operation("http_util::parse_header_to_str")
    })?;

    let value = if let Some(v) = headers.get(&name) {
        v
    } else {
        return Ok(None);
    };

    Ok(Some(value.to_str().map_err(|e| {
        Error::new(
            ErrorKind::Unexpected,
            "header value must be valid utf-8 string but not",
        )
        .with_operation("http_util::parse_header_to_str")
        .with_context("header_name", name.as_str())
        .set_source(e)
    })?))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn test_parse_content_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_content_length(&headers).unwrap(), None);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("50000"));
        assert_eq!(parse_content_length(&headers).unwrap(), Some(50000));

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("fifty"));
        assert!(parse_content_length(&headers).is_err());
    }

    #[test]
    fn test_parse_header_to_str() {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-request-id", HeaderValue::from_static("4442587FB7D0A2F9"));

        assert_eq!(
            parse_header_to_str(&headers, "x-amz-request-id").unwrap(),
            Some("4442587FB7D0A2F9")
        );
        assert_eq!(parse_header_to_str(&headers, "x-amz-id-2").unwrap(), None);
    }
}
