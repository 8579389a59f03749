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

mod client_secret;
mod imds;
mod workload_identity;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use datastore_core::{Context, HttpSend, Result, StaticEnv};

/// Answers every request with a canned token response and keeps the requests.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    status: u16,
    body: &'static str,
    pub requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl TokenEndpoint {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            body,
            requests: Arc::default(),
        }
    }

    pub fn failing(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            requests: Arc::default(),
        }
    }

    pub fn last_request(&self) -> http::Request<Bytes> {
        self.requests
            .lock()
            .unwrap()
            .pop()
            .expect("a token request must be sent")
    }
}

#[async_trait]
impl HttpSend for TokenEndpoint {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        Ok(http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(self.body.as_bytes()))
            .unwrap())
    }
}

pub fn context(http: TokenEndpoint, envs: &[(&str, &str)]) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new()
        .with_file_read(datastore_file_read_tokio::TokioFileRead)
        .with_http_send(http)
        .with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
}
