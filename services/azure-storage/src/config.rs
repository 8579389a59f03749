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

use std::fmt::{Debug, Formatter};

use datastore_core::utils::Redact;
use datastore_core::{Context, Result};

use crate::connection_string;
use crate::constants::*;
use crate::Service;

/// Config carries all the configuration for Azure Storage services.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `endpoint` of the storage service, e.g. `https://account.blob.core.windows.net`.
    ///
    /// Only filled by connection strings; the environment never sets it.
    pub endpoint: Option<String>,
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`] or [`AZBLOB_ACCOUNT_NAME`]
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`] or [`AZBLOB_ACCOUNT_KEY`]
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_SAS_TOKEN`]
    pub sas_token: Option<String>,
    /// Specifies the object id associated with a user assigned managed service identity resource
    ///
    /// The values of client_id and msi_res_id are discarded
    /// - env value: [`AZURE_OBJECT_ID`]
    pub object_id: Option<String>,
    /// Specifies the application id (client id) associated with a user assigned managed service identity resource
    ///
    /// The values of object_id and msi_res_id are discarded
    /// - env value: [`AZURE_CLIENT_ID`]
    pub client_id: Option<String>,
    /// Specifies the ARM resource id of the user assigned managed service identity resource
    ///
    /// The values of object_id and client_id are discarded
    /// - env value: [`AZURE_MSI_RES_ID`]
    pub msi_res_id: Option<String>,
    /// Specifies the header that should be used to retrieve the access token.
    ///
    /// This header mitigates server-side request forgery (SSRF) attacks.
    /// - env value: [`AZURE_MSI_SECRET`]
    pub msi_secret: Option<String>,
    /// Specifies the endpoint from which the identity should be retrieved.
    ///
    /// If not specified, the default endpoint of `http://169.254.169.254/metadata/identity/oauth2/token` will be used.
    /// - env value: [`AZURE_MSI_ENDPOINT`]
    pub msi_endpoint: Option<String>,
    /// `federated_token_file` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_FEDERATED_TOKEN_FILE`]
    pub federated_token_file: Option<String>,
    /// `tenant_id` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_TENANT_ID`]
    pub tenant_id: Option<String>,
    /// `authority_host` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_AUTHORITY_HOST`]
    /// - the public cloud, `https://login.microsoftonline.com`
    pub authority_host: Option<String>,
    /// `client_secret` value will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_CLIENT_SECRET`]
    pub client_secret: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("object_id", &self.object_id)
            .field("client_id", &self.client_id)
            .field("msi_res_id", &self.msi_res_id)
            .field("msi_secret", &Redact::from(&self.msi_secret))
            .field("msi_endpoint", &self.msi_endpoint)
            .field("federated_token_file", &self.federated_token_file)
            .field("tenant_id", &self.tenant_id)
            .field("authority_host", &self.authority_host)
            .field("client_secret", &Redact::from(&self.client_secret))
            .finish()
    }
}

impl Config {
    /// Load config from the context's environment.
    ///
    /// Fields that are already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| envs.get(*k).filter(|v| !v.is_empty()).cloned())
        };

        self.account_name = self
            .account_name
            .or_else(|| get(&[AZURE_STORAGE_ACCOUNT_NAME, AZBLOB_ACCOUNT_NAME]));
        self.account_key = self
            .account_key
            .or_else(|| get(&[AZURE_STORAGE_ACCOUNT_KEY, AZBLOB_ACCOUNT_KEY]));
        self.sas_token = self.sas_token.or_else(|| get(&[AZURE_STORAGE_SAS_TOKEN]));
        self.object_id = self.object_id.or_else(|| get(&[AZURE_OBJECT_ID]));
        self.client_id = self.client_id.or_else(|| get(&[AZURE_CLIENT_ID]));
        self.msi_res_id = self.msi_res_id.or_else(|| get(&[AZURE_MSI_RES_ID]));
        self.msi_secret = self.msi_secret.or_else(|| get(&[AZURE_MSI_SECRET]));
        self.msi_endpoint = self.msi_endpoint.or_else(|| get(&[AZURE_MSI_ENDPOINT]));
        self.federated_token_file = self
            .federated_token_file
            .or_else(|| get(&[AZURE_FEDERATED_TOKEN_FILE]));
        self.tenant_id = self.tenant_id.or_else(|| get(&[AZURE_TENANT_ID]));
        self.client_secret = self.client_secret.or_else(|| get(&[AZURE_CLIENT_SECRET]));
        self.authority_host = self
            .authority_host
            .or_else(|| get(&[AZURE_AUTHORITY_HOST]))
            .or_else(|| Some(AZURE_PUBLIC_CLOUD.to_string()));

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// The function takes a Service parameter because it determines the fields used
    /// to parse the endpoint.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str, service: Service) -> Result<Self> {
        connection_string::parse(conn_str, service)
    }
}
