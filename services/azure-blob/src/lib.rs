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

//! Azure Blob Storage clients and repositories.
//!
//! - [`BlobServiceClient`], [`BlobContainerClient`] and [`BlobClient`] issue
//!   single REST calls against one account, container or blob.
//! - [`BlobStorageRepository`], [`BlobContainerRepository`] and
//!   [`BlobClientRepository`] wrap them with the upload / download
//!   operations applications use, and log what they do.
//!
//! Everything is built explicitly from a [`StorageEndpoint`].
//!
//! ## Example
//!
//! ```no_run
//! use datastore_azure_blob::{Attachment, BlobContainerRepository, UploadOptions};
//! use datastore_azure_storage::{Service, StorageEndpoint};
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
//!     let endpoint =
//!         StorageEndpoint::from_connection_string(ctx, "UseDevelopmentStorage=true", Service::Blob)?;
//!
//!     let repo = BlobContainerRepository::from_endpoint(endpoint, "reports")?;
//!     let uri = repo
//!         .upload_blob("2024/summary.txt", "all good", &UploadOptions::default())
//!         .await?;
//!     println!("uploaded to {uri}");
//!
//!     let files = vec![Attachment::new("a.txt", "a"), Attachment::new("b.txt", "b")];
//!     let uris = repo.upload_attachments(&files).await;
//!     println!("uploaded {} of {} files", uris.len(), files.len());
//!
//!     Ok(())
//! }
//! ```

mod attachment;
pub use attachment::Attachment;

mod client;
pub use client::{BlobClient, BlobContainerClient, BlobServiceClient};
pub use client::{UploadOptions, DEFAULT_CONTENT_TYPE};

mod repository;
pub use repository::{BlobClientRepository, BlobContainerRepository, BlobStorageRepository};
pub use repository::BlobReader;

pub use datastore_azure_storage::StorageEndpoint;
