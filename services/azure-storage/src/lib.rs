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

//! Azure Storage plumbing shared by the blob and table crates.
//!
//! This crate knows how to find a credential, how to sign a request for the
//! Blob or Table service with it, and how to send it:
//!
//! - [`Credential`] and the credential providers: static, config, env, client
//!   secret, workload identity, managed identity (IMDS), anonymous and the
//!   default chain.
//! - [`RequestSigner`]: Shared Key (Blob and Table flavours), SAS and bearer.
//! - [`StorageEndpoint`]: endpoint URL + signer + context, built once from a
//!   [`CredentialSource`] and shared by every client.
//! - [`check_response`] / [`parse_error`]: status code to error mapping.
//!
//! ## Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use datastore_azure_storage::{check_response, Service, StorageEndpoint};
//! use datastore_core::{Context, OsEnv, Result};
//! use datastore_file_read_tokio::TokioFileRead;
//! use datastore_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let endpoint =
//!         StorageEndpoint::from_connection_string(ctx, "UseDevelopmentStorage=true", Service::Blob)?;
//!
//!     let req = http::Request::head(endpoint.url("photos/cat.png")).body(Bytes::new())?;
//!     let resp = check_response(endpoint.send(req).await?, "get blob properties")?;
//!     println!("Response: {}", resp.status());
//!
//!     Ok(())
//! }
//! ```

pub mod constants;

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod endpoint;
pub use endpoint::{CredentialSource, StorageEndpoint};

mod provide_credential;
pub use provide_credential::*;

mod response;
pub use response::{check_response, error_code, parse_error};

mod service;
pub use service::Service;

mod sign_request;
pub use sign_request::RequestSigner;
