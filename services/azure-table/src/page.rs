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
use std::str::FromStr;

use datastore_core::{Error, Result};

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Entities in service order: partition key, then row key.
    pub items: Vec<T>,
    /// Where the next page starts, `None` once the query is exhausted.
    pub continuation: Option<ContinuationToken>,
}

impl<T> Page<T> {
    /// Whether another page follows.
    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

/// Opaque position of the next page, produced by the service.
///
/// Its string form can be handed to a client and parsed back to resume a
/// query later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken {
    next_partition_key: String,
    next_row_key: Option<String>,
}

impl ContinuationToken {
    pub(crate) fn new(next_partition_key: String, next_row_key: Option<String>) -> Self {
        Self {
            next_partition_key,
            next_row_key,
        }
    }

    pub(crate) fn next_partition_key(&self) -> &str {
        &self.next_partition_key
    }

    pub(crate) fn next_row_key(&self) -> Option<&str> {
        self.next_row_key.as_deref()
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.next_row_key {
            Some(rk) => write!(f, "{} {}", self.next_partition_key, rk),
            None => f.write_str(&self.next_partition_key),
        }
    }
}

impl FromStr for ContinuationToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::request_invalid("continuation token is empty"));
        }

        Ok(match s.split_once(' ') {
            Some((pk, rk)) => Self::new(pk.to_string(), Some(rk.to_string())),
            None => Self::new(s.to_string(), None),
        })
    }
}
