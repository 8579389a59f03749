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

//! Map storage service responses onto datastore errors.

use bytes::Bytes;
use datastore_core::{Error, Result};
use http::{Response, StatusCode};

use crate::constants::X_MS_ERROR_CODE;

/// Longest body excerpt carried into an error message.
const MAX_BODY_EXCERPT: usize = 256;

/// Return `Ok(resp)` for any 2xx response, the mapped error otherwise.
pub fn check_response(resp: Response<Bytes>, operation: &str) -> Result<Response<Bytes>> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(parse_error(&resp, operation))
    }
}

/// Build the error for a non-2xx response.
///
/// - `404` is [`ErrorKind::NotFound`](datastore_core::ErrorKind::NotFound)
/// - `409` is [`ErrorKind::Conflict`](datastore_core::ErrorKind::Conflict)
/// - `412` is [`ErrorKind::PreconditionFailed`](datastore_core::ErrorKind::PreconditionFailed)
/// - everything else, auth failures included, is [`ErrorKind::Transport`](datastore_core::ErrorKind::Transport)
pub fn parse_error(resp: &Response<Bytes>, operation: &str) -> Error {
    let status = resp.status();
    let mut message = format!("{operation} failed with status {status}");
    if let Some(code) = error_code(resp) {
        message.push_str(&format!(" ({code})"));
    }

    let body = String::from_utf8_lossy(resp.body());
    let body = body.trim();
    if !body.is_empty() {
        let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        message.push_str(": ");
        message.push_str(&excerpt);
    }

    match status {
        StatusCode::NOT_FOUND => Error::not_found(message),
        StatusCode::CONFLICT => Error::conflict(message),
        StatusCode::PRECONDITION_FAILED => Error::precondition_failed(message),
        _ => Error::transport(message),
    }
}

/// The service error code, e.g. `ContainerAlreadyExists` or `TableAlreadyExists`.
pub fn error_code(resp: &Response<Bytes>) -> Option<&str> {
    resp.headers()
        .get(X_MS_ERROR_CODE)
        .and_then(|v| v.to_str().ok())
}
