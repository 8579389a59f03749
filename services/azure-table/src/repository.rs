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

use std::fmt;
use std::marker::PhantomData;

use datastore_azure_storage::StorageEndpoint;
use datastore_core::{Error, ErrorKind, Result};
use log::{debug, error, info};

use crate::{ContinuationToken, Page, TableEntity, TableServiceClient};

/// Entity repository over every table of one account.
///
/// The table is named per call. Failures the caller is expected to handle
/// (missing entity, taken keys, stale etag) are logged at debug level, every
/// other failure at error level.
pub struct TableStorageRepository<T> {
    client: TableServiceClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for TableStorageRepository<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TableStorageRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableStorageRepository")
            .field("client", &self.client)
            .finish()
    }
}

impl<T: TableEntity> TableStorageRepository<T> {
    /// Create a repository over an existing service client.
    pub fn new(client: TableServiceClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    /// Create a repository over a table endpoint.
    pub fn from_endpoint(endpoint: StorageEndpoint) -> Result<Self> {
        Ok(Self::new(TableServiceClient::new(endpoint)?))
    }

    /// The underlying client.
    pub fn client(&self) -> &TableServiceClient {
        &self.client
    }

    /// Create `table` if it does not exist yet.
    pub async fn create_table(&self, table: &str) -> Result<()> {
        let created = self
            .client
            .create_table(table)
            .await
            .map_err(|e| log_failure(e, &format!("create table {table}")))?;
        if created {
            info!("created table {table}");
        }
        Ok(())
    }

    /// Delete `table`. Fails with `NotFound` if it does not exist.
    pub async fn delete_table(&self, table: &str) -> Result<()> {
        self.client
            .delete_table(table)
            .await
            .map_err(|e| log_failure(e, &format!("delete table {table}")))?;
        info!("deleted table {table}");
        Ok(())
    }

    /// Insert `entity`. Fails with `Conflict` if its keys are taken.
    pub async fn insert(&self, table: &str, entity: &mut T) -> Result<()> {
        self.client
            .table_client(table)
            .insert(entity)
            .await
            .map_err(|e| log_failure(e, &entity_op("insert", table, &*entity)))?;
        info!(
            "inserted entity ({}, {}) of table {table}",
            entity.partition_key(),
            entity.row_key()
        );
        Ok(())
    }

    /// Insert `entity` or replace the entity stored under its keys.
    pub async fn upsert(&self, table: &str, entity: &mut T) -> Result<()> {
        self.client
            .table_client(table)
            .upsert(entity)
            .await
            .map_err(|e| log_failure(e, &entity_op("upsert", table, &*entity)))?;
        info!(
            "upserted entity ({}, {}) of table {table}",
            entity.partition_key(),
            entity.row_key()
        );
        Ok(())
    }

    /// Replace the stored entity if it still matches the etag of `entity`.
    pub async fn update(&self, table: &str, entity: &mut T) -> Result<()> {
        self.client
            .table_client(table)
            .update(entity)
            .await
            .map_err(|e| log_failure(e, &entity_op("update", table, &*entity)))?;
        info!(
            "updated entity ({}, {}) of table {table}",
            entity.partition_key(),
            entity.row_key()
        );
        Ok(())
    }

    /// Fetch one entity. Fails with `NotFound` if absent.
    pub async fn get(&self, table: &str, partition_key: &str, row_key: &str) -> Result<T> {
        self.client
            .table_client(table)
            .get(partition_key, row_key)
            .await
            .map_err(|e| {
                log_failure(
                    e,
                    &format!("get entity ({partition_key}, {row_key}) of table {table}"),
                )
            })
    }

    /// Delete one entity whatever its etag. Deleting an absent entity
    /// succeeds.
    pub async fn delete(&self, table: &str, partition_key: &str, row_key: &str) -> Result<()> {
        match self
            .client
            .table_client(table)
            .delete_entity(partition_key, row_key, None)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("entity ({partition_key}, {row_key}) of table {table} already deleted: {e}");
                Ok(())
            }
            Err(e) => Err(log_failure(
                e,
                &format!("delete entity ({partition_key}, {row_key}) of table {table}"),
            )),
        }
    }

    /// Fetch every entity matching `filter`, following continuation tokens
    /// until the query is exhausted.
    pub async fn query(&self, table: &str, filter: &str) -> Result<Vec<T>> {
        let client = self.client.table_client(table);
        let mut items = Vec::new();
        let mut continuation = None;

        loop {
            let page: Page<T> = client
                .query_page(Some(filter), None, continuation.as_ref())
                .await
                .map_err(|e| log_failure(e, &format!("query table {table}")))?;
            items.extend(page.items);
            match page.continuation {
                Some(token) => continuation = Some(token),
                None => return Ok(items),
            }
        }
    }

    /// Fetch one page of at most `page_size` entities matching `filter`.
    ///
    /// Pass `None` as `continuation` for the first page and the token of the
    /// previous page after that.
    pub async fn query_paged(
        &self,
        table: &str,
        filter: &str,
        page_size: usize,
        continuation: Option<&ContinuationToken>,
    ) -> Result<Page<T>> {
        if page_size == 0 {
            return Err(Error::request_invalid("page size must be at least 1"));
        }

        self.client
            .table_client(table)
            .query_page(Some(filter), Some(page_size), continuation)
            .await
            .map_err(|e| log_failure(e, &format!("query table {table}")))
    }
}

fn entity_op(op: &str, table: &str, entity: &impl TableEntity) -> String {
    format!(
        "{op} entity ({}, {}) of table {table}",
        entity.partition_key(),
        entity.row_key()
    )
}

fn log_failure(e: Error, operation: &str) -> Error {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::PreconditionFailed => {
            debug!("{operation} failed: {e}")
        }
        _ => error!("error occurred while trying to {operation}: {e}"),
    }
    e
}
