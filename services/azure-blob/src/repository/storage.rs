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

use bytes::Bytes;
use datastore_azure_storage::StorageEndpoint;
use datastore_core::Result;

use super::BlobReader;
use crate::{Attachment, BlobServiceClient, UploadOptions};

/// Blob repository over a whole account; the container is passed per call.
///
/// [`upload_blob`](Self::upload_blob) expects the container to exist, while
/// attachment uploads create it first.
#[derive(Debug, Clone)]
pub struct BlobStorageRepository {
    client: BlobServiceClient,
}

impl BlobStorageRepository {
    /// Create a repository over an existing service client.
    pub fn new(client: BlobServiceClient) -> Self {
        Self { client }
    }

    /// Create a repository over a blob endpoint.
    pub fn from_endpoint(endpoint: StorageEndpoint) -> Result<Self> {
        Ok(Self::new(BlobServiceClient::new(endpoint)?))
    }

    /// The underlying client.
    pub fn client(&self) -> &BlobServiceClient {
        &self.client
    }

    /// Whether `name` exists in `container`.
    pub async fn exists(&self, container: &str, name: &str) -> Result<bool> {
        super::exists(&self.client.blob_client(container, name)).await
    }

    /// Download `name` from `container`, decoding it as UTF-8.
    pub async fn download_as_string(&self, container: &str, name: &str) -> Result<String> {
        super::download_as_string(&self.client.blob_client(container, name)).await
    }

    /// Download `name` from `container` into an in-memory reader.
    pub async fn download_as_stream(&self, container: &str, name: &str) -> Result<BlobReader> {
        super::download_as_stream(&self.client.blob_client(container, name)).await
    }

    /// Upload `content` as `name` into an existing `container`, overwriting.
    ///
    /// Returns the blob URI.
    pub async fn upload_blob(
        &self,
        container: &str,
        name: &str,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> Result<String> {
        let blob = self.client.blob_client(container, name);
        super::upload_blob(&blob, content.into(), options).await
    }

    /// Upload `file` under its file name, creating `container` if absent.
    pub async fn upload_attachment(&self, container: &str, file: &Attachment) -> Result<String> {
        let container = self.client.container_client(container);
        super::create_container(&container).await?;
        super::upload_attachment(&container.blob_client(&file.file_name), file).await
    }

    /// Upload every file under its file name, creating `container` if absent.
    ///
    /// Failed files, including those the container could not be created
    /// for, are logged and left out of the result. An empty batch sends
    /// nothing.
    pub async fn upload_attachments(&self, container: &str, files: &[Attachment]) -> Vec<String> {
        let container = self.client.container_client(container);
        super::upload_attachments(files, Some(&container), |file| {
            container.blob_client(&file.file_name)
        })
        .await
    }

    /// Download any blob of this account by its absolute URI.
    pub async fn download_by_absolute_uri(&self, uri: &str) -> Result<String> {
        let blob = super::blob_from_uri(&self.client, uri)?;
        super::download_as_string(&blob).await
    }
}
