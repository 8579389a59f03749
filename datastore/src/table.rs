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

//! Azure Table Storage clients and repository, with one-call constructors.

pub use datastore_azure_table::*;

#[cfg(feature = "default-context")]
use crate::{default_context, CredentialSource, Result, Service, StorageEndpoint};

/// Create a table endpoint over [`default_context`].
#[cfg(feature = "default-context")]
pub fn default_endpoint(endpoint: &str, source: CredentialSource) -> Result<StorageEndpoint> {
    StorageEndpoint::new(default_context(), endpoint, source, Service::Table)
}

/// Create a table endpoint from a connection string over [`default_context`].
#[cfg(feature = "default-context")]
pub fn endpoint_from_connection_string(conn_str: &str) -> Result<StorageEndpoint> {
    StorageEndpoint::from_connection_string(default_context(), conn_str, Service::Table)
}

/// Create a repository of `T` entities over every table of one account.
///
/// ```no_run
/// use datastore::table::{default_table_repository, DynamicEntity};
/// use datastore::CredentialSource;
///
/// # async fn example() -> datastore::Result<()> {
/// let repo = default_table_repository::<DynamicEntity>(
///     "https://myaccount.table.core.windows.net",
///     CredentialSource::Default,
/// )?;
/// let people = repo.query("people", "PartitionKey eq 'team-a'").await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_table_repository<T: TableEntity>(
    endpoint: &str,
    source: CredentialSource,
) -> Result<TableStorageRepository<T>> {
    TableStorageRepository::from_endpoint(default_endpoint(endpoint, source)?)
}
