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

use std::fmt::{Display, Formatter};

use crate::constants::{
    AZURITE_BLOB_URI, AZURITE_TABLE_URI, BLOB_SERVICE_VERSION, TABLE_SERVICE_VERSION,
};

/// The storage service an endpoint talks to.
///
/// Blob and Table share accounts and credentials but differ in their
/// endpoint host, pinned API version and Shared Key signature format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Azure Blob Storage.
    Blob,
    /// Azure Table Storage.
    Table,
}

impl Service {
    /// Name of the service as it appears in the endpoint host, e.g. `blob` in
    /// `https://account.blob.core.windows.net`.
    pub fn endpoint_name(&self) -> &'static str {
        match self {
            Service::Blob => "blob",
            Service::Table => "table",
        }
    }

    /// Key of the explicit endpoint in a connection string.
    pub(crate) fn connection_string_key(&self) -> &'static str {
        match self {
            Service::Blob => "BlobEndpoint",
            Service::Table => "TableEndpoint",
        }
    }

    /// The `x-ms-version` sent with every request.
    pub fn api_version(&self) -> &'static str {
        match self {
            Service::Blob => BLOB_SERVICE_VERSION,
            Service::Table => TABLE_SERVICE_VERSION,
        }
    }

    pub(crate) fn development_storage_uri(&self) -> &'static str {
        match self {
            Service::Blob => AZURITE_BLOB_URI,
            Service::Table => AZURITE_TABLE_URI,
        }
    }
}

impl Display for Service {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint_name())
    }
}
