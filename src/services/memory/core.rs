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

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

#[derive(Clone, Default)]
pub struct MemoryCore {
    data: Arc<Mutex<HashMap<(String, String), Bytes>>>,
}

impl Debug for MemoryCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCore")
            .field("objects", &self.data.lock().len())
            .finish_non_exhaustive()
    }
}

impl MemoryCore {
    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.data
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn set(&self, bucket: &str, key: &str, value: Bytes) {
        self.data
            .lock()
            .insert((bucket.to_string(), key.to_string()), value);
    }

    pub fn delete(&self, bucket: &str, key: &str) {
        self.data
            .lock()
            .remove(&(bucket.to_string(), key.to_string()));
    }
}
