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

//! Azure Table Storage clients and an entity repository.
//!
//! - [`TableServiceClient`] and [`TableClient`] issue single REST calls.
//! - [`TableStorageRepository`] offers table lifecycle, entity CRUD with
//!   optimistic concurrency, and paged queries for any [`TableEntity`].
//! - [`DynamicEntity`] is a ready-made schemaless entity.
//!
//! ## Example
//!
//! ```no_run
//! use datastore_azure_storage::{Service, StorageEndpoint};
//! use datastore_azure_table::{DynamicEntity, TableStorageRepository};
//! use datastore_core::{Context, OsEnv, Result};
//! use datastore_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!     let endpoint =
//!         StorageEndpoint::from_connection_string(ctx, "UseDevelopmentStorage=true", Service::Table)?;
//!     let repo = TableStorageRepository::<DynamicEntity>::from_endpoint(endpoint)?;
//!
//!     repo.create_table("people").await?;
//!     let mut alice = DynamicEntity::new("team-a", "alice").with_property("Age", 42);
//!     repo.upsert("people", &mut alice).await?;
//!
//!     let mut page = repo.query_paged("people", "PartitionKey eq 'team-a'", 100, None).await?;
//!     println!("first page has {} people", page.items.len());
//!     while let Some(token) = page.continuation.take() {
//!         page = repo
//!             .query_paged("people", "PartitionKey eq 'team-a'", 100, Some(&token))
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
pub use client::{TableClient, TableServiceClient};

mod entity;
pub use entity::{DynamicEntity, TableEntity};

mod page;
pub use page::{ContinuationToken, Page};

mod repository;
pub use repository::TableStorageRepository;
