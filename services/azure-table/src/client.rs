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
use datastore_azure_storage::constants::{
    AZURE_PATH_ENCODE_SET, AZURE_QUERY_ENCODE_SET, DATA_SERVICE_VERSION,
    X_MS_CONTINUATION_NEXT_PARTITION_KEY, X_MS_CONTINUATION_NEXT_ROW_KEY,
};
use datastore_azure_storage::{check_response, error_code, Service, StorageEndpoint};
use datastore_core::{Error, Result};
use http::header::{self, HeaderValue};
use http::{request, Method, Request, Response, StatusCode};
use log::debug;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::entity::{decode_entity, encode_entity};
use crate::{ContinuationToken, Page, TableEntity};

const ACCEPT_MINIMAL_METADATA: &str = "application/json;odata=minimalmetadata";
const CONTENT_TYPE_JSON: &str = "application/json";
const PREFER_NO_CONTENT: &str = "return-no-content";

/// Client bound to the table service of one account.
#[derive(Debug, Clone)]
pub struct TableServiceClient {
    endpoint: StorageEndpoint,
}

impl TableServiceClient {
    /// Create a client over a table endpoint.
    pub fn new(endpoint: StorageEndpoint) -> Result<Self> {
        if endpoint.service() != Service::Table {
            return Err(Error::config_invalid(format!(
                "table client needs a table endpoint, got {} endpoint {}",
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

    /// A client for `table`. Nothing is sent.
    pub fn table_client(&self, table: &str) -> TableClient {
        TableClient {
            endpoint: self.endpoint.clone(),
            table: table.to_string(),
        }
    }

    /// Create `table` unless it already exists.
    ///
    /// Returns `true` if this call created it.
    pub async fn create_table(&self, table: &str) -> Result<bool> {
        let body = serde_json::to_vec(&json!({ "TableName": table }))?;
        let req = table_request(Method::POST, self.endpoint.url("Tables"))
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header("prefer", PREFER_NO_CONTENT)
            .body(Bytes::from(body))?;
        let resp = self.endpoint.send(req).await?;

        if resp.status() == StatusCode::CONFLICT
            && error_code(&resp).map_or(true, |code| code == "TableAlreadyExists")
        {
            debug!("table {table} already exists");
            return Ok(false);
        }

        check_response(resp, &format!("create table {table}"))?;
        Ok(true)
    }

    /// Delete `table` and every entity in it. Fails with `NotFound` if absent.
    pub async fn delete_table(&self, table: &str) -> Result<()> {
        let path = format!("Tables('{}')", encode_key(table));
        let req = table_request(Method::DELETE, self.endpoint.url(&path)).body(Bytes::new())?;

        check_response(
            self.endpoint.send(req).await?,
            &format!("delete table {table}"),
        )?;
        Ok(())
    }
}

/// Client bound to one table.
#[derive(Debug, Clone)]
pub struct TableClient {
    endpoint: StorageEndpoint,
    table: String,
}

impl TableClient {
    /// Create a client for `table` over a table endpoint.
    pub fn new(endpoint: StorageEndpoint, table: &str) -> Result<Self> {
        Ok(TableServiceClient::new(endpoint)?.table_client(table))
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.table
    }

    /// Create this table unless it already exists.
    pub async fn create_if_not_exists(&self) -> Result<bool> {
        self.service_client().create_table(&self.table).await
    }

    /// Delete this table.
    pub async fn delete(&self) -> Result<()> {
        self.service_client().delete_table(&self.table).await
    }

    fn service_client(&self) -> TableServiceClient {
        TableServiceClient {
            endpoint: self.endpoint.clone(),
        }
    }

    fn table_url(&self) -> String {
        self.endpoint
            .url(&utf8_percent_encode(&self.table, &AZURE_PATH_ENCODE_SET).to_string())
    }

    fn entity_url(&self, partition_key: &str, row_key: &str) -> String {
        format!(
            "{}(PartitionKey='{}',RowKey='{}')",
            self.table_url(),
            encode_key(partition_key),
            encode_key(row_key)
        )
    }

    /// Insert `entity`, failing with `Conflict` if its keys are taken.
    ///
    /// The new etag is stored on `entity`.
    pub async fn insert<T: TableEntity>(&self, entity: &mut T) -> Result<()> {
        let req = table_request(Method::POST, self.table_url())
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header("prefer", PREFER_NO_CONTENT)
            .body(Bytes::from(encode_entity(entity)?))?;

        let resp = check_response(
            self.endpoint.send(req).await?,
            &format!("insert entity into {}", self.table),
        )?;
        entity.set_etag(etag_header(&resp));
        Ok(())
    }

    /// Insert `entity` or replace whatever is stored under its keys.
    pub async fn upsert<T: TableEntity>(&self, entity: &mut T) -> Result<()> {
        self.put(entity, None).await
    }

    /// Replace the stored entity, but only if it still carries the etag of
    /// `entity`. A stale etag fails with `PreconditionFailed`.
    pub async fn update<T: TableEntity>(&self, entity: &mut T) -> Result<()> {
        let Some(etag) = entity.etag().map(str::to_string) else {
            return Err(Error::request_invalid(format!(
                "entity ({}, {}) has no etag to update against",
                entity.partition_key(),
                entity.row_key()
            )));
        };
        self.put(entity, Some(&etag)).await
    }

    async fn put<T: TableEntity>(&self, entity: &mut T, if_match: Option<&str>) -> Result<()> {
        let mut builder = table_request(
            Method::PUT,
            self.entity_url(entity.partition_key(), entity.row_key()),
        )
        .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON);
        if let Some(etag) = if_match {
            builder = builder.header(header::IF_MATCH, HeaderValue::from_str(etag)?);
        }
        let req = builder.body(Bytes::from(encode_entity(entity)?))?;

        let resp = check_response(
            self.endpoint.send(req).await?,
            &format!(
                "write entity ({}, {}) of {}",
                entity.partition_key(),
                entity.row_key(),
                self.table
            ),
        )?;
        entity.set_etag(etag_header(&resp));
        Ok(())
    }

    /// Fetch one entity. Fails with `NotFound` if absent.
    pub async fn get<T: TableEntity>(&self, partition_key: &str, row_key: &str) -> Result<T> {
        let req =
            table_request(Method::GET, self.entity_url(partition_key, row_key)).body(Bytes::new())?;
        let resp = check_response(
            self.endpoint.send(req).await?,
            &format!("get entity ({partition_key}, {row_key}) of {}", self.table),
        )?;

        let object: Map<String, Value> = serde_json::from_slice(resp.body())?;
        decode_entity(object, etag_header(&resp).as_deref())
    }

    /// Delete one entity. `etag` of `None` deletes unconditionally.
    pub async fn delete_entity(
        &self,
        partition_key: &str,
        row_key: &str,
        etag: Option<&str>,
    ) -> Result<()> {
        let req = table_request(Method::DELETE, self.entity_url(partition_key, row_key))
            .header(header::IF_MATCH, HeaderValue::from_str(etag.unwrap_or("*"))?)
            .body(Bytes::new())?;

        check_response(
            self.endpoint.send(req).await?,
            &format!("delete entity ({partition_key}, {row_key}) of {}", self.table),
        )?;
        Ok(())
    }

    /// Fetch one page of entities matching the OData `filter`.
    ///
    /// A blank filter matches everything. `top` caps the page size, the
    /// service never returns more than 1000 entities per page.
    pub async fn query_page<T: TableEntity>(
        &self,
        filter: Option<&str>,
        top: Option<usize>,
        continuation: Option<&ContinuationToken>,
    ) -> Result<Page<T>> {
        let mut query = Vec::new();
        if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
            query.push(("$filter", filter.to_string()));
        }
        if let Some(top) = top {
            query.push(("$top", top.to_string()));
        }
        if let Some(token) = continuation {
            query.push(("NextPartitionKey", token.next_partition_key().to_string()));
            if let Some(rk) = token.next_row_key() {
                query.push(("NextRowKey", rk.to_string()));
            }
        }

        let mut url = format!("{}()", self.table_url());
        for (idx, (k, v)) in query.iter().enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            url.push_str(k);
            url.push('=');
            url.push_str(&utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET).to_string());
        }

        let req = table_request(Method::GET, url).body(Bytes::new())?;
        let resp = check_response(
            self.endpoint.send(req).await?,
            &format!("query entities of {}", self.table),
        )?;

        let continuation = continuation_token(&resp);
        let body: QueryResponse = serde_json::from_slice(resp.body())?;
        let items = body
            .value
            .into_iter()
            .map(|object| decode_entity(object, None))
            .collect::<Result<Vec<T>>>()?;

        Ok(Page {
            items,
            continuation,
        })
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
}

/// A request builder carrying the headers every table call needs.
fn table_request(method: Method, url: String) -> request::Builder {
    Request::builder()
        .method(method)
        .uri(url)
        .header(header::ACCEPT, ACCEPT_MINIMAL_METADATA)
        .header(DATA_SERVICE_VERSION, "3.0")
        .header("maxdataserviceversion", "3.0;NetFx")
}

/// Quote-escape a key for use in a resource path, then percent-encode it.
fn encode_key(key: &str) -> String {
    utf8_percent_encode(&key.replace('\'', "''"), &AZURE_QUERY_ENCODE_SET).to_string()
}

fn etag_header(resp: &Response<Bytes>) -> Option<String> {
    resp.headers()
        .get(header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn continuation_token(resp: &Response<Bytes>) -> Option<ContinuationToken> {
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header(X_MS_CONTINUATION_NEXT_PARTITION_KEY)
        .map(|pk| ContinuationToken::new(pk, header(X_MS_CONTINUATION_NEXT_ROW_KEY)))
}
