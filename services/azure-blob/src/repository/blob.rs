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
use crate::{Attachment, BlobClient, UploadOptions};

/// Blob repository bound to one blob.
///
/// Every upload writes the bound blob, whatever the attachment's file name,
/// and the container is expected to exist.
#[derive(Debug, Clone)]
pub struct BlobClientRepository {
    client: BlobClient,
}

impl BlobClientRepository {
    /// Create a repository over an existing blob client.
    pub fn new(client: BlobClient) -> Self {
        Self { client }
    }

    /// Create a repository for `blob` in `container` over a blob endpoint.
    pub fn from_endpoint(endpoint: StorageEndpoint, container: &str, blob: &str) -> Result<Self> {
        Ok(Self::new(BlobClient::new(endpoint, container, blob)?))
    }

    /// The underlying client.
    pub fn client(&self) -> &BlobClient {
        &self.client
    }

    pub async fn exists(&self) -> Result<bool> {
        super::exists(&self.client).await
    }

    pub async fn download_as_string(&self) -> Result<String> {
        super::download_as_string(&self.client).await
    }

    pub async fn download_as_stream(&self) -> Result<BlobReader> {
        super::download_as_stream(&self.client).await
    }

    /// Replace the blob with `content`. Returns the blob URI.
    pub async fn upload_blob(
        &self,
        content: impl Into<Bytes>,
        options: &UploadOptions,
    ) -> Result<String> {
        super::upload_blob(&self.client, content.into(), options).await
    }

    /// Replace the blob with the content of `file`.
    pub async fn upload_attachment(&self, file: &Attachment) -> Result<String> {
        super::upload_attachment(&self.client, file).await
    }

    /// Write every file to the bound blob in order, so the last successful
    /// one wins. The result holds the blob URI once per successful file.
    pub async fn upload_attachments(&self, files: &[Attachment]) -> Vec<String> {
        super::upload_attachments(files, None, |_| self.client.clone()).await
    }

    /// Download any blob of this account by its absolute URI.
    pub async fn download_by_absolute_uri(&self, uri: &str) -> Result<String> {
        let container = self.client.container_client();
        let blob = super::blob_from_uri(&container.service_client(), uri)?;
        super::download_as_string(&blob).await
    }
}
