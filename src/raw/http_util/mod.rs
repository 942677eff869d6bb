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

//! http_util contains the util types and functions that used across
//! http based services.

mod client;
pub use client::HttpClient;

mod body;
pub use body::Body;
pub use body::IncomingBody;

mod header;
pub use header::parse_content_length;
pub use header::parse_header_to_str;

mod uri;
pub use uri::percent_encode_path;

mod error;
pub use error::new_request_build_error;
pub use error::new_request_send_error;
pub use error::new_request_sign_error;
pub use error::parse_error_response;
pub use error::with_error_response_context;
pub use error::ErrorResponse;
