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

use crate::raw::*;

/// Layer is used to intercept the operations on the underlying storage.
///
/// Struct that implement this trait must accept input [`Accessor`] as inner,
/// and returns a new [`Accessor`] as output.
///
/// All functions in [`Access`] requires `&self`, so it's implementor's
/// responsibility to maintain the internal mutability. Please also keep in
/// mind that [`Access`] requires `Send` and `Sync`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use s3store::layers::Layer;
/// use s3store::raw::*;
///
/// /// Implement the real accessor logic here.
/// #[derive(Debug)]
/// struct TraceAccessor {
///     inner: Accessor,
/// }
///
/// impl Access for TraceAccessor {
///     fn info(&self) -> AccessorInfo {
///         self.inner.info()
///     }
/// }
///
/// /// The public struct that exposed to users.
/// struct TraceLayer;
///
/// impl Layer for TraceLayer {
///     fn layer(&self, inner: Accessor) -> Accessor {
///         Arc::new(TraceAccessor { inner })
///     }
/// }
/// ```
pub trait Layer {
    /// Intercept the operations on the underlying storage.
    fn layer(&self, inner: Accessor) -> Accessor;
}
