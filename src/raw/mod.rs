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

//! Raw modules provide raw APIs that used by underlying services.
//!
//! Users of s3store only need [`ResourceStore`][crate::ResourceStore] and
//! [`ObjectReader`][crate::ObjectReader]. Raw APIs are for backend
//! implementors and for people who want to drive an [`ObjectSession`]
//! directly.

mod accessor;
pub use accessor::*;

mod ops;
pub use ops::*;

mod bytes_range;
pub use bytes_range::*;

mod chunk;
pub use chunk::*;

mod session;
pub use session::*;

mod std_io_util;
pub use std_io_util::*;

mod http_util;
pub use http_util::*;
