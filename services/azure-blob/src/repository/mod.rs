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

//! Repository-style access to blobs.
//!
//! Three variants share one behavior and differ only in scope:
//!
//! - [`BlobStorageRepository`] takes the container on every call.
//! - [`BlobContainerRepository`] is bound to one container.
//! - [`BlobClientRepository`] is bound to one blob.
//!
//! Repositories log every upload at info level and every failure at error
//! level. Clients underneath do not log.

mod blob;
pub use blob::BlobClientRepository;
mod container;
pub use container::BlobContainerRepository;
mod storage;
pub use storage::BlobStorageRepository;

use std::collections::HashMap;

use bytes::buf::Reader;
use bytes::{Buf, Bytes};
use datastore_core::Result;
use log::{debug, error, info};

use crate::{Attachment, BlobClient, BlobContainerClient, BlobServiceClient, UploadOptions};

/// In-memory reader over a downloaded blob.
pub type BlobReader = Reader<Bytes>;

async fn exists(blob: &BlobClient) -> Result<bool> {
    match blob.exists().await {
        Ok(v) => Ok(v),
        Err(e) => {
            error!(
                "error occurred while checking blob {} in container {}: {e}",
                blob.name(),
                blob.container_name()
            );
            Err(e)
        }
    }
}

async fn download(blob: &BlobClient) -> Result<Bytes> {
    match blob.download().await {
        Ok(content) => Ok(content),
        Err(e) if e.is_not_found() => {
            debug!(
                "blob {} not found in container {}",
                blob.name(),
                blob.container_name()
            );
            Err(e)
        }
        Err(e) => {
            error!(
                "error occurred while downloading blob {} from container {}: {e}",
                blob.name(),
                blob.container_name()
            );
            Err(e)
        }
    }
}

async fn download_as_string(blob: &BlobClient) -> Result<String> {
    let content = download(blob).await?;
    Ok(String::from_utf8_lossy(&content).into_owned())
}

async fn download_as_stream(blob: &BlobClient) -> Result<BlobReader> {
    Ok(download(blob).await?.reader())
}

async fn upload_blob(blob: &BlobClient, content: Bytes, options: &UploadOptions) -> Result<String> {
    match blob.upload(content, options).await {
        Ok(uri) => {
            info!(
                "uploaded blob {} to container {}",
                blob.name(),
                blob.container_name()
            );
            Ok(uri)
        }
        Err(e) => {
            error!(
                "error occurred while uploading blob {} to container {}: {e}",
                blob.name(),
                blob.container_name()
            );
            Err(e)
        }
    }
}

fn attachment_options(file: &Attachment) -> UploadOptions {
    UploadOptions {
        content_type: file.content_type.clone(),
        metadata: HashMap::new(),
    }
}

async fn upload_attachment(blob: &BlobClient, file: &Attachment) -> Result<String> {
    match blob.upload(file.content.clone(), &attachment_options(file)).await {
        Ok(uri) => {
            info!("file {} uploaded to blob storage", file.file_name);
            Ok(uri)
        }
        Err(e) => {
            error!(
                "error occurred while uploading file {}: {e}",
                file.file_name
            );
            Err(e)
        }
    }
}

/// Upload every file through the blob `target` picks for it.
///
/// With a `container`, it is created before the first file goes out. A
/// failed creation counts as that file's failure and is tried again for the
/// next one. Failed files are logged once and left out of the result.
async fn upload_attachments(
    files: &[Attachment],
    mut container: Option<&BlobContainerClient>,
    target: impl Fn(&Attachment) -> BlobClient,
) -> Vec<String> {
    let mut uris = Vec::with_capacity(files.len());
    for file in files {
        if let Some(client) = container {
            if let Err(e) = ensure_container(client).await {
                error!(
                    "error occurred while uploading file {}: {e}",
                    file.file_name
                );
                continue;
            }
            container = None;
        }
        if let Ok(uri) = upload_attachment(&target(file), file).await {
            uris.push(uri);
        }
    }
    uris
}

async fn ensure_container(container: &BlobContainerClient) -> Result<()> {
    if container.create_if_not_exists().await? {
        info!("created container {}", container.name());
    }
    Ok(())
}

async fn create_container(container: &BlobContainerClient) -> Result<()> {
    ensure_container(container).await.map_err(|e| {
        error!(
            "error occurred while creating container {}: {e}",
            container.name()
        );
        e
    })
}

/// Resolve `uri` into a blob of the same account.
fn blob_from_uri(service: &BlobServiceClient, uri: &str) -> Result<BlobClient> {
    service.blob_client_from_url(uri).map_err(|e| {
        error!("error occurred while resolving blob uri {uri}: {e}");
        e
    })
}
