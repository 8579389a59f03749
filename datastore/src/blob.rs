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

//! Azure Blob Storage clients and repositories, with one-call constructors.

pub use datastore_azure_blob::*;

#[cfg(feature = "default-context")]
use crate::{default_context, CredentialSource, Result, Service};

/// Create a blob endpoint over [`default_context`].
///
/// ```no_run
/// use datastore::blob::default_endpoint;
/// use datastore::CredentialSource;
///
/// # fn example() -> datastore::Result<()> {
/// let endpoint = default_endpoint(
///     "https://myaccount.blob.core.windows.net",
///     CredentialSource::ManagedIdentity {
///         client_id: "00000000-0000-0000-0000-000000000000".to_string(),
///     },
/// )?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_endpoint(endpoint: &str, source: CredentialSource) -> Result<StorageEndpoint> {
    StorageEndpoint::new(default_context(), endpoint, source, Service::Blob)
}

/// Create a blob endpoint from a connection string over [`default_context`].
#[cfg(feature = "default-context")]
pub fn endpoint_from_connection_string(conn_str: &str) -> Result<StorageEndpoint> {
    StorageEndpoint::from_connection_string(default_context(), conn_str, Service::Blob)
}

/// Create a repository over a whole account.
#[cfg(feature = "default-context")]
pub fn default_storage_repository(
    endpoint: &str,
    source: CredentialSource,
) -> Result<BlobStorageRepository> {
    BlobStorageRepository::from_endpoint(default_endpoint(endpoint, source)?)
}

/// Create a repository bound to `container`.
///
/// ```no_run
/// use datastore::blob::{default_container_repository, UploadOptions};
/// use datastore::CredentialSource;
///
/// # async fn example() -> datastore::Result<()> {
/// let repo = default_container_repository(
///     "https://myaccount.blob.core.windows.net",
///     CredentialSource::Default,
///     "reports",
/// )?;
/// repo.upload_blob("summary.txt", "all good", &UploadOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_container_repository(
    endpoint: &str,
    source: CredentialSource,
    container: &str,
) -> Result<BlobContainerRepository> {
    BlobContainerRepository::from_endpoint(default_endpoint(endpoint, source)?, container)
}

/// Create a repository bound to `blob` in `container`.
#[cfg(feature = "default-context")]
pub fn default_blob_repository(
    endpoint: &str,
    source: CredentialSource,
    container: &str,
    blob: &str,
) -> Result<BlobClientRepository> {
    BlobClientRepository::from_endpoint(default_endpoint(endpoint, source)?, container, blob)
}
