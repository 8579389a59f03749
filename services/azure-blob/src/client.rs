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

use bytes::Bytes;
use datastore_azure_storage::constants::{AZURE_PATH_ENCODE_SET, X_MS_BLOB_TYPE, X_MS_META_PREFIX};
use datastore_azure_storage::{check_response, error_code, Service, StorageEndpoint};
use datastore_core::{Error, Result};
use http::header::{self, HeaderName, HeaderValue};
use http::{Request, StatusCode};
use log::debug;
use percent_encoding::utf8_percent_encode;

/// Content type used by [`UploadOptions::default`].
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Options of a blob upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// `Content-Type` stored with the blob. `None` lets the service pick
    /// `application/octet-stream`.
    pub content_type: Option<String>,
    /// User metadata, sent as `x-ms-meta-*` headers.
    pub metadata: HashMap<String, String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            metadata: HashMap::new(),
        }
    }
}

impl UploadOptions {
    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add one metadata pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Client bound to the blob service of one account.
#[derive(Debug, Clone)]
pub struct BlobServiceClient {
    endpoint: StorageEndpoint,
}

impl BlobServiceClient {
    /// Create a client over a blob endpoint.
    pub fn new(endpoint: StorageEndpoint) -> Result<Self> {
        if endpoint.service() != Service::Blob {
            return Err(Error::config_invalid(format!(
                "blob client needs a blob endpoint, got {} endpoint {}",
                endpoint.service(),
                endpoint.endpoint()
            )));
        }

        Ok(Self { endpoint })
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    /// A client for `container`. Nothing is sent.
    pub fn container_client(&self, container: &str) -> BlobContainerClient {
        BlobContainerClient {
            endpoint: self.endpoint.clone(),
            container: container.to_string(),
        }
    }

    /// A client for `blob` in `container`. Nothing is sent.
    pub fn blob_client(&self, container: &str, blob: &str) -> BlobClient {
        self.container_client(container).blob_client(blob)
    }

    /// Resolve an absolute blob URL of this account into a blob client.
    ///
    /// Fails with `RequestInvalid` for URLs of another account, or URLs that
    /// name a container but no blob.
    pub fn blob_client_from_url(&self, url: &str) -> Result<BlobClient> {
        let path = self.endpoint.relative_path(url)?;
        match path.split_once('/') {
            Some((container, blob)) if !container.is_empty() && !blob.is_empty() => {
                Ok(self.blob_client(container, blob))
            }
            _ => Err(Error::request_invalid(format!(
                "{url} does not name a blob"
            ))),
        }
    }
}

/// Client bound to one container.
#[derive(Debug, Clone)]
pub struct BlobContainerClient {
    endpoint: StorageEndpoint,
    container: String,
}

impl BlobContainerClient {
    /// Create a client for `container` over a blob endpoint.
    pub fn new(endpoint: StorageEndpoint, container: &str) -> Result<Self> {
        Ok(BlobServiceClient::new(endpoint)?.container_client(container))
    }

    /// The container name.
    pub fn name(&self) -> &str {
        &self.container
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    /// A client for the service this container lives in.
    pub fn service_client(&self) -> BlobServiceClient {
        BlobServiceClient {
            endpoint: self.endpoint.clone(),
        }
    }

    /// The container URL.
    pub fn url(&self) -> String {
        self.endpoint
            .url(&utf8_percent_encode(&self.container, &AZURE_PATH_ENCODE_SET).to_string())
    }

    /// A client for `blob` in this container. Nothing is sent.
    pub fn blob_client(&self, blob: &str) -> BlobClient {
        BlobClient {
            endpoint: self.endpoint.clone(),
            container: self.container.clone(),
            blob: blob.to_string(),
        }
    }

    /// Create the container unless it already exists.
    ///
    /// Returns `true` if this call created it.
    pub async fn create_if_not_exists(&self) -> Result<bool> {
        let req = Request::put(format!("{}?restype=container", self.url())).body(Bytes::new())?;
        let resp = self.endpoint.send(req).await?;

        if resp.status() == StatusCode::CONFLICT
            && error_code(&resp).map_or(true, |code| code == "ContainerAlreadyExists")
        {
            debug!("container {} already exists", self.container);
            return Ok(false);
        }

        check_response(resp, &format!("create container {}", self.container))?;
        Ok(true)
    }
}

/// Client bound to one blob.
#[derive(Debug, Clone)]
pub struct BlobClient {
    endpoint: StorageEndpoint,
    container: String,
    blob: String,
}

impl BlobClient {
    /// Create a client for `blob` in `container` over a blob endpoint.
    pub fn new(endpoint: StorageEndpoint, container: &str, blob: &str) -> Result<Self> {
        Ok(BlobServiceClient::new(endpoint)?.blob_client(container, blob))
    }

    /// The container name.
    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// The blob name.
    pub fn name(&self) -> &str {
        &self.blob
    }

    /// A client for the container this blob lives in.
    pub fn container_client(&self) -> BlobContainerClient {
        BlobContainerClient {
            endpoint: self.endpoint.clone(),
            container: self.container.clone(),
        }
    }

    /// The canonical, percent-encoded URL of this blob.
    pub fn url(&self) -> String {
        self.endpoint.url(&format!(
            "{}/{}",
            utf8_percent_encode(&self.container, &AZURE_PATH_ENCODE_SET),
            utf8_percent_encode(&self.blob, &AZURE_PATH_ENCODE_SET)
        ))
    }

    /// Whether the blob exists. A missing container counts as a missing blob.
    pub async fn exists(&self) -> Result<bool> {
        let req = Request::head(self.url()).body(Bytes::new())?;
        let resp = self.endpoint.send(req).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_response(resp, &format!("get properties of blob {}", self.url()))?;
        Ok(true)
    }

    /// Download the whole blob into memory.
    pub async fn download(&self) -> Result<Bytes> {
        let req = Request::get(self.url()).body(Bytes::new())?;
        let resp = check_response(
            self.endpoint.send(req).await?,
            &format!("download blob {}", self.url()),
        )?;

        Ok(resp.into_body())
    }

    /// Upload `content` as a block blob, replacing whatever is stored.
    ///
    /// Returns the blob URL.
    pub async fn upload(&self, content: Bytes, options: &UploadOptions) -> Result<String> {
        let url = self.url();
        let mut req = Request::put(&url)
            .header(X_MS_BLOB_TYPE, "BlockBlob")
            .body(content)?;

        let headers = req.headers_mut();
        if let Some(content_type) = &options.content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        }
        for (key, value) in &options.metadata {
            let name = HeaderName::from_bytes(format!("{X_MS_META_PREFIX}{key}").as_bytes())?;
            headers.insert(name, HeaderValue::from_str(value)?);
        }

        check_response(
            self.endpoint.send(req).await?,
            &format!("upload blob {url}"),
        )?;
        Ok(url)
    }
}
