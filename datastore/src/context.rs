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

use async_trait::async_trait;
use bytes::Bytes;
use datastore_core::{Context, Env, FileRead, HttpSend, OsEnv, Result};
use datastore_file_read_tokio::TokioFileRead;
use datastore_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;

/// The context most applications want: files read with tokio, requests sent
/// with reqwest and environment variables taken from the process.
#[derive(Debug, Default, Clone)]
pub struct DefaultContext {
    http: ReqwestHttpSend,
}

impl DefaultContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send requests with an already configured client, e.g. one with
    /// proxies or custom timeouts.
    pub fn with_client(client: Client) -> Self {
        Self {
            http: ReqwestHttpSend::new(client),
        }
    }

    /// Wire this context into a [`Context`].
    pub fn into_context(self) -> Context {
        Context::new()
            .with_file_read(self.clone())
            .with_http_send(self.clone())
            .with_env(self)
    }
}

#[async_trait]
impl FileRead for DefaultContext {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        TokioFileRead.file_read(path).await
    }
}

#[async_trait]
impl HttpSend for DefaultContext {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }
}

impl Env for DefaultContext {
    fn var(&self, key: &str) -> Option<String> {
        OsEnv.var(key)
    }

    fn vars(&self) -> HashMap<String, String> {
        OsEnv.vars()
    }
}

/// A [`Context`] backed by [`DefaultContext`].
pub fn default_context() -> Context {
    DefaultContext::new().into_context()
}
