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

//! In-memory stand-in for the Blob REST surface used by the repositories.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use datastore_azure_storage::{Service, StorageEndpoint};
use datastore_core::{Context, Error, HttpSend, Result};
use http::{Method, Request, Response, StatusCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content: Bytes,
    pub content_type: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    containers: HashMap<String, HashMap<String, StoredBlob>>,
    failing: HashSet<String>,
    failing_creations: HashMap<String, usize>,
    requests: usize,
}

/// Blob service keeping containers and blobs in memory.
///
/// Requests without an `Authorization` header are refused, and blobs marked
/// with [`FakeBlobService::fail_on`] fail in transport.
#[derive(Debug, Clone, Default)]
pub struct FakeBlobService {
    state: Arc<Mutex<State>>,
}

impl FakeBlobService {
    pub fn fail_on(&self, blob: &str) {
        self.state.lock().unwrap().failing.insert(blob.to_string());
    }

    /// Fail the next `times` creations of `container` in transport.
    pub fn fail_creating(&self, container: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failing_creations
            .insert(container.to_string(), times);
    }

    pub fn create_container(&self, container: &str) {
        self.state
            .lock()
            .unwrap()
            .containers
            .entry(container.to_string())
            .or_default();
    }

    pub fn has_container(&self, container: &str) -> bool {
        self.state.lock().unwrap().containers.contains_key(container)
    }

    pub fn blob(&self, container: &str, blob: &str) -> Option<StoredBlob> {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(container)
            .and_then(|blobs| blobs.get(blob))
            .cloned()
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn endpoint(&self) -> StorageEndpoint {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_http_send(self.clone());
        StorageEndpoint::from_connection_string(ctx, "UseDevelopmentStorage=true", Service::Blob)
            .unwrap()
    }

    fn handle(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        if !req.headers().contains_key(http::header::AUTHORIZATION) {
            return Ok(error_response(StatusCode::FORBIDDEN, "AuthenticationFailed"));
        }

        let (container, blob) = split_path(req.uri().path());
        if let Some(blob) = &blob {
            if state.failing.contains(blob) {
                return Err(Error::transport(format!("connection reset while sending {blob}")));
            }
        }

        let is_container_op = req.uri().query() == Some("restype=container");
        match (req.method().clone(), blob) {
            (Method::PUT, None) if is_container_op => {
                if let Some(left) = state.failing_creations.get_mut(&container) {
                    if *left > 0 {
                        *left -= 1;
                        return Err(Error::transport(format!(
                            "connection reset while creating {container}"
                        )));
                    }
                }
                if state.containers.contains_key(&container) {
                    return Ok(error_response(StatusCode::CONFLICT, "ContainerAlreadyExists"));
                }
                state.containers.insert(container, HashMap::new());
                Ok(status(StatusCode::CREATED))
            }
            (Method::PUT, Some(blob)) => {
                let Some(blobs) = state.containers.get_mut(&container) else {
                    return Ok(error_response(StatusCode::NOT_FOUND, "ContainerNotFound"));
                };
                let headers = req.headers();
                let stored = StoredBlob {
                    content_type: headers
                        .get(http::header::CONTENT_TYPE)
                        .map(|v| v.to_str().unwrap().to_string()),
                    metadata: headers
                        .iter()
                        .filter_map(|(k, v)| {
                            k.as_str()
                                .strip_prefix("x-ms-meta-")
                                .map(|k| (k.to_string(), v.to_str().unwrap().to_string()))
                        })
                        .collect(),
                    content: req.into_body(),
                };
                blobs.insert(blob, stored);
                Ok(status(StatusCode::CREATED))
            }
            (Method::HEAD, Some(blob)) | (Method::GET, Some(blob)) => {
                let Some(blobs) = state.containers.get(&container) else {
                    return Ok(error_response(StatusCode::NOT_FOUND, "ContainerNotFound"));
                };
                let Some(stored) = blobs.get(&blob) else {
                    return Ok(error_response(StatusCode::NOT_FOUND, "BlobNotFound"));
                };
                let body = if *req.method() == Method::GET {
                    stored.content.clone()
                } else {
                    Bytes::new()
                };
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .header("content-length", stored.content.len())
                    .body(body)
                    .unwrap())
            }
            _ => Ok(error_response(StatusCode::BAD_REQUEST, "UnsupportedHttpVerb")),
        }
    }
}

#[async_trait]
impl HttpSend for FakeBlobService {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.handle(req)
    }
}

/// Split `/devstoreaccount1/{container}/{blob}` into its decoded parts.
fn split_path(path: &str) -> (String, Option<String>) {
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("devstoreaccount1/").unwrap_or(path);
    let decode = |s: &str| {
        percent_encoding::percent_decode_str(s)
            .decode_utf8_lossy()
            .into_owned()
    };

    match path.split_once('/') {
        Some((container, blob)) if !blob.is_empty() => (decode(container), Some(decode(blob))),
        Some((container, _)) => (decode(container), None),
        None => (decode(path), None),
    }
}

fn status(code: StatusCode) -> Response<Bytes> {
    Response::builder().status(code).body(Bytes::new()).unwrap()
}

fn error_response(code: StatusCode, error_code: &str) -> Response<Bytes> {
    Response::builder()
        .status(code)
        .header("x-ms-error-code", error_code)
        .body(Bytes::from(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>{error_code}</Code></Error>"
        )))
        .unwrap()
}
