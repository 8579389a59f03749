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

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use datastore_core::{Error, Result};

/// An entity stored in a table.
///
/// Entities are serialized with serde: the partition key must serialize as
/// `PartitionKey` and the row key as `RowKey`. The ETag travels outside the
/// payload, so implementors should mark their etag field `#[serde(skip)]`.
///
/// ```
/// use datastore_azure_table::TableEntity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Person {
///     #[serde(rename = "PartitionKey")]
///     team: String,
///     #[serde(rename = "RowKey")]
///     email: String,
///     #[serde(rename = "Name")]
///     name: String,
///     #[serde(skip)]
///     etag: Option<String>,
/// }
///
/// impl TableEntity for Person {
///     fn partition_key(&self) -> &str {
///         &self.team
///     }
///     fn row_key(&self) -> &str {
///         &self.email
///     }
///     fn etag(&self) -> Option<&str> {
///         self.etag.as_deref()
///     }
///     fn set_etag(&mut self, etag: Option<String>) {
///         self.etag = etag;
///     }
/// }
/// ```
pub trait TableEntity: Serialize + DeserializeOwned + Send + Sync {
    /// The partition key.
    fn partition_key(&self) -> &str;
    /// The row key, unique within the partition.
    fn row_key(&self) -> &str;
    /// The concurrency token of the stored version, if this entity was read
    /// from or written to the service.
    fn etag(&self) -> Option<&str>;
    /// Replace the concurrency token.
    fn set_etag(&mut self, etag: Option<String>);
}

/// A schemaless entity: keys plus a bag of JSON properties.
///
/// Property values are passed through as the service returns them. Typed
/// values (`Edm.Int64`, `Edm.DateTime`, ...) stay in their JSON form and keep
/// their `<name>@odata.type` annotation, so a read entity is written back
/// with the same types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    #[serde(rename = "RowKey")]
    pub row_key: String,
    /// Last modification time set by the service, never sent back.
    #[serde(rename = "Timestamp", default, skip_serializing)]
    pub timestamp: Option<String>,
    #[serde(skip)]
    pub etag: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl DynamicEntity {
    /// Create an entity without properties.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            ..Default::default()
        }
    }

    /// Set one property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Get one property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl TableEntity for DynamicEntity {
    fn partition_key(&self) -> &str {
        &self.partition_key
    }

    fn row_key(&self) -> &str {
        &self.row_key
    }

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn set_etag(&mut self, etag: Option<String>) {
        self.etag = etag;
    }
}

const ODATA_ETAG: &str = "odata.etag";
const TIMESTAMP_TYPE: &str = "Timestamp@odata.type";

/// Serialize an entity into the JSON body of a write.
pub(crate) fn encode_entity<T: TableEntity>(entity: &T) -> Result<Vec<u8>> {
    let mut value = serde_json::to_value(entity)?;
    match value.as_object_mut() {
        Some(object) => {
            object.remove(ODATA_ETAG);
            object.remove(TIMESTAMP_TYPE);
        }
        None => {
            return Err(Error::request_invalid(
                "table entity must serialize into a JSON object",
            ))
        }
    }

    Ok(serde_json::to_vec(&value)?)
}

/// Build an entity from one JSON object returned by the service.
///
/// `odata.*` metadata is dropped, property type annotations are kept. The
/// etag is taken from the payload, or from `etag_header` when the payload
/// has none.
pub(crate) fn decode_entity<T: TableEntity>(
    mut object: Map<String, Value>,
    etag_header: Option<&str>,
) -> Result<T> {
    let etag = match object.remove(ODATA_ETAG) {
        Some(Value::String(etag)) => Some(etag),
        _ => etag_header.map(str::to_string),
    };
    object.retain(|key, _| !key.starts_with("odata.") && key != TIMESTAMP_TYPE);

    let mut entity: T = serde_json::from_value(Value::Object(object))?;
    entity.set_etag(etag);
    Ok(entity)
}
