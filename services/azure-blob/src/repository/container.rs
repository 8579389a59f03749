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
use crate::{Attachment, BlobContainerClient, UploadOptions};

/// Blob repository bound to one container.
///
/// Every upload creates the container first if it does not exist.
#[derive(Debug, Clone)]
pub struct BlobContainerRepository {
    client: BlobContainerClient,
}

impl BlobContainerRepository {
    /// Create a repository over an existing container client.
    pub fn new(client: BlobContainerClient) -> Self {
        Self { client }
    }

    /// Create a repository for `container` over a blob endpoint.
    pub fn from_endpoint(endpoint: StorageEndpoint, container: &str) -> Result<Self> {
        Ok(Self::new(BlobContainerClient::new(endpoint, container)?))
    }

    /// The underlying client.
    pub fn client(&self) -> &BlobContainerClient {
        &self.client
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        super::exists(&self.client.blob_client(name)).await
    }

    pub async fn download_as_string(&self, name: &str) -> Result<String> {
        super::download_as_string(&self.client.blob_client(name)).await
    }

    pub async fn download_as_stream(&self, name: &str) -> Result<BlobReader> {
        super::download_as_stream(&self.client.blob_client(name)).await
    }

    /// Upload `content` as `name`, overwriting. Returns the blob URI.
    pub async fn upload_blob(
        &self,
        name: &str,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> Result<String> {
        super::create_container(&self.client).await?;
        super::upload_blob(&self.client.blob_client(name), content.into(), options).await
    }

    pub async fn upload_attachment(&self, file: &Attachment) -> Result<String> {
        super::create_container(&self.client).await?;
        super::upload_attachment(&self.client.blob_client(&file.file_name), file).await
    }

    /// Upload every file under its file name.
    ///
    /// The container is created before the first file goes out. Failed
    /// files are logged and left out of the result.
    pub async fn upload_attachments(&self, files: &[Attachment]) -> Vec<String> {
        super::upload_attachments(files, Some(&self.client), |file| {
            self.client.blob_client(&file.file_name)
        })
        .await
    }

    /// Download any blob of this account by its absolute URI, not only
    /// blobs of the bound container.
    pub async fn download_by_absolute_uri(&self, uri: &str) -> Result<String> {
        let blob = super::blob_from_uri(&self.client.service_client(), uri)?;
        super::download_as_string(&blob).await
    }
}
