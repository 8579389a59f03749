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

//! In-memory stand-in for the Table REST surface used by the repository.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use datastore_azure_storage::{Service, StorageEndpoint};
use datastore_core::{Context, HttpSend, Result};
use http::{Method, Request, Response, StatusCode};
use serde_json::{json, Map, Value};

type Entities = BTreeMap<(String, String), (Map<String, Value>, String)>;

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Entities>,
    versions: u64,
    requests: usize,
}

impl State {
    fn next_etag(&mut self) -> String {
        self.versions += 1;
        format!("W/\"datetime'2024-03-01T08%3A00%3A{:02}.{}Z'\"", self.versions % 60, self.versions)
    }
}

/// Table service keeping tables and entities in memory, sorted by keys like
/// the real service.
#[derive(Debug, Clone, Default)]
pub struct FakeTableService {
    state: Arc<Mutex<State>>,
}

enum Resource {
    Tables,
    Table(String),
    Query(String),
    Entity(String, String, String),
    Entities(String),
}

impl FakeTableService {
    pub fn endpoint(&self) -> StorageEndpoint {
        let _ = env_logger::builder().is_test(true).try_init();

        let ctx = Context::new().with_http_send(self.clone());
        StorageEndpoint::from_connection_string(ctx, "UseDevelopmentStorage=true", Service::Table)
            .unwrap()
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state.lock().unwrap().tables.contains_key(table)
    }

    fn handle(&self, req: Request<Bytes>) -> Response<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        if !req.headers().contains_key(http::header::AUTHORIZATION) {
            return error_response(StatusCode::FORBIDDEN, "AuthenticationFailed");
        }
        let Some(resource) = parse_path(req.uri().path()) else {
            return error_response(StatusCode::BAD_REQUEST, "InvalidUri");
        };
        let if_match = req
            .headers()
            .get(http::header::IF_MATCH)
            .map(|v| v.to_str().unwrap().to_string());

        match (req.method().clone(), resource) {
            (Method::POST, Resource::Tables) => {
                let body: Value = serde_json::from_slice(req.body()).unwrap();
                let name = body["TableName"].as_str().unwrap().to_string();
                if state.tables.contains_key(&name) {
                    return error_response(StatusCode::CONFLICT, "TableAlreadyExists");
                }
                state.tables.insert(name, Entities::new());
                status(StatusCode::NO_CONTENT)
            }
            (Method::DELETE, Resource::Table(name)) => match state.tables.remove(&name) {
                Some(_) => status(StatusCode::NO_CONTENT),
                None => error_response(StatusCode::NOT_FOUND, "ResourceNotFound"),
            },
            (Method::POST, Resource::Entities(table)) => {
                let object = entity_body(&req);
                let key = entity_key(&object);
                let etag = state.next_etag();
                let Some(entities) = state.tables.get_mut(&table) else {
                    return error_response(StatusCode::NOT_FOUND, "TableNotFound");
                };
                if entities.contains_key(&key) {
                    return error_response(StatusCode::CONFLICT, "EntityAlreadyExists");
                }
                entities.insert(key, (object, etag.clone()));
                with_etag(StatusCode::NO_CONTENT, &etag)
            }
            (Method::PUT, Resource::Entity(table, pk, rk)) => {
                let object = entity_body(&req);
                let etag = state.next_etag();
                let Some(entities) = state.tables.get_mut(&table) else {
                    return error_response(StatusCode::NOT_FOUND, "TableNotFound");
                };
                let key = (pk, rk);
                if let Some(expected) = if_match {
                    let Some((_, current)) = entities.get(&key) else {
                        return error_response(StatusCode::NOT_FOUND, "ResourceNotFound");
                    };
                    if expected != "*" && &expected != current {
                        return error_response(
                            StatusCode::PRECONDITION_FAILED,
                            "UpdateConditionNotSatisfied",
                        );
                    }
                }
                entities.insert(key, (object, etag.clone()));
                with_etag(StatusCode::NO_CONTENT, &etag)
            }
            (Method::GET, Resource::Entity(table, pk, rk)) => {
                let Some(entities) = state.tables.get(&table) else {
                    return error_response(StatusCode::NOT_FOUND, "TableNotFound");
                };
                let Some((object, etag)) = entities.get(&(pk, rk)) else {
                    return error_response(StatusCode::NOT_FOUND, "ResourceNotFound");
                };
                let mut body = annotated(object, etag);
                body.insert(
                    "odata.metadata".to_string(),
                    json!(format!("$metadata#{table}/@Element")),
                );
                Response::builder()
                    .status(StatusCode::OK)
                    .header("etag", etag.as_str())
                    .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap()
            }
            (Method::DELETE, Resource::Entity(table, pk, rk)) => {
                let Some(entities) = state.tables.get_mut(&table) else {
                    return error_response(StatusCode::NOT_FOUND, "TableNotFound");
                };
                let key = (pk, rk);
                let current = entities.get(&key).map(|(_, etag)| etag.clone());
                match (current, if_match) {
                    (None, _) => error_response(StatusCode::NOT_FOUND, "ResourceNotFound"),
                    (Some(current), Some(expected)) if expected == "*" || expected == current => {
                        entities.remove(&key);
                        status(StatusCode::NO_CONTENT)
                    }
                    _ => error_response(
                        StatusCode::PRECONDITION_FAILED,
                        "UpdateConditionNotSatisfied",
                    ),
                }
            }
            (Method::GET, Resource::Query(table)) => {
                let Some(entities) = state.tables.get(&table) else {
                    return error_response(StatusCode::NOT_FOUND, "TableNotFound");
                };
                query(&table, entities, req.uri().query().unwrap_or_default())
            }
            _ => error_response(StatusCode::BAD_REQUEST, "InvalidInput"),
        }
    }
}

#[async_trait]
impl HttpSend for FakeTableService {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        Ok(self.handle(req))
    }
}

fn query(table: &str, entities: &Entities, query: &str) -> Response<Bytes> {
    let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    let Some(filter) = parse_filter(params.get("$filter").map(String::as_str)) else {
        return error_response(StatusCode::BAD_REQUEST, "InvalidInput");
    };
    let top: usize = params
        .get("$top")
        .map(|v| v.parse().unwrap())
        .unwrap_or(1000);
    let start = (
        params.get("NextPartitionKey").cloned().unwrap_or_default(),
        params.get("NextRowKey").cloned().unwrap_or_default(),
    );

    let mut matching = entities
        .range(start..)
        .filter(|((pk, rk), _)| match &filter {
            Filter::All => true,
            Filter::PartitionKey(v) => pk == v,
            Filter::RowKey(v) => rk == v,
        });
    let value: Vec<Value> = matching
        .by_ref()
        .take(top)
        .map(|(_, (object, etag))| Value::Object(annotated(object, etag)))
        .collect();

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(((pk, rk), _)) = matching.next() {
        builder = builder
            .header("x-ms-continuation-NextPartitionKey", pk.as_str())
            .header("x-ms-continuation-NextRowKey", rk.as_str());
    }
    let body = json!({
        "odata.metadata": format!("$metadata#{table}"),
        "value": value,
    });
    builder
        .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

enum Filter {
    All,
    PartitionKey(String),
    RowKey(String),
}

/// Understands a blank filter and `PartitionKey eq '..'` / `RowKey eq '..'`.
fn parse_filter(filter: Option<&str>) -> Option<Filter> {
    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Some(Filter::All);
    };
    let (field, value) = filter.split_once(" eq ")?;
    let value = value
        .trim()
        .strip_prefix('\'')?
        .strip_suffix('\'')?
        .replace("''", "'");
    match field.trim() {
        "PartitionKey" => Some(Filter::PartitionKey(value)),
        "RowKey" => Some(Filter::RowKey(value)),
        _ => None,
    }
}

fn parse_path(path: &str) -> Option<Resource> {
    let path = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .ok()?
        .into_owned();
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("devstoreaccount1/").unwrap_or(path);

    if path == "Tables" {
        return Some(Resource::Tables);
    }
    let Some((name, args)) = path.split_once('(') else {
        return Some(Resource::Entities(path.to_string()));
    };
    let args = args.strip_suffix(')')?;
    if name == "Tables" {
        let (table, rest) = quoted(args)?;
        return rest.is_empty().then_some(Resource::Table(table));
    }
    if args.is_empty() {
        return Some(Resource::Query(name.to_string()));
    }

    let (pk, rest) = quoted(args.strip_prefix("PartitionKey=")?)?;
    let (rk, rest) = quoted(rest.strip_prefix(",RowKey=")?)?;
    rest.is_empty()
        .then(|| Resource::Entity(name.to_string(), pk, rk))
}

/// Read a `'quoted'` literal with `''` escapes, returning it and the rest.
fn quoted(s: &str) -> Option<(String, &str)> {
    let s = s.strip_prefix('\'')?;
    let mut value = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '\'' {
            value.push(c);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            value.push('\'');
            chars.next();
            continue;
        }
        return Some((value, &s[idx + 1..]));
    }
    None
}

fn entity_body(req: &Request<Bytes>) -> Map<String, Value> {
    match serde_json::from_slice(req.body()).unwrap() {
        Value::Object(object) => object,
        other => panic!("entity body must be an object, got {other}"),
    }
}

fn entity_key(object: &Map<String, Value>) -> (String, String) {
    (
        object["PartitionKey"].as_str().unwrap().to_string(),
        object["RowKey"].as_str().unwrap().to_string(),
    )
}

fn annotated(object: &Map<String, Value>, etag: &str) -> Map<String, Value> {
    let mut object = object.clone();
    object.insert("odata.etag".to_string(), json!(etag));
    object.insert("Timestamp".to_string(), json!("2024-03-01T08:00:00Z"));
    object.insert("Timestamp@odata.type".to_string(), json!("Edm.DateTime"));
    object
}

fn status(code: StatusCode) -> Response<Bytes> {
    Response::builder().status(code).body(Bytes::new()).unwrap()
}

fn with_etag(code: StatusCode, etag: &str) -> Response<Bytes> {
    Response::builder()
        .status(code)
        .header("etag", etag)
        .body(Bytes::new())
        .unwrap()
}

fn error_response(code: StatusCode, error_code: &str) -> Response<Bytes> {
    let body = json!({
        "odata.error": {
            "code": error_code,
            "message": {"lang": "en-US", "value": format!("{error_code} reported by fake")}
        }
    });
    Response::builder()
        .status(code)
        .header("x-ms-error-code", error_code)
        .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}
