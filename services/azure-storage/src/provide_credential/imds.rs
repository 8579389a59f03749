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

use async_trait::async_trait;
use datastore_core::{Context, Error, ProvideCredential, Result};
use log::debug;

use super::AccessTokenResponse;
use crate::constants::{AZURE_IMDS_ENDPOINT, AZURE_STORAGE_RESOURCE};
use crate::{Config, Credential};

/// Load credential from the Azure Instance Metadata Service, aka managed identity.
///
/// Without any identity selected the system-assigned identity is used. A
/// user-assigned identity is picked by exactly one of object id, client id or
/// msi resource id, checked in that order.
///
/// Reference: <https://learn.microsoft.com/en-us/entra/identity/managed-identities-azure-resources/how-to-use-vm-token>
#[derive(Debug, Default, Clone)]
pub struct ImdsCredentialProvider {
    config: Config,
}

impl ImdsCredentialProvider {
    /// Create a new IMDS loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader using the managed identity fields of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Select a user-assigned identity by client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    /// Select a user-assigned identity by object id.
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.config.object_id = Some(object_id.into());
        self
    }

    /// Select a user-assigned identity by ARM resource id.
    pub fn with_msi_res_id(mut self, msi_res_id: impl Into<String>) -> Self {
        self.config.msi_res_id = Some(msi_res_id.into());
        self
    }

    /// Override the token endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.msi_endpoint = Some(endpoint.into());
        self
    }

    /// Send `X-IDENTITY-HEADER` with the token request.
    pub fn with_msi_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.msi_secret = Some(secret.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ImdsCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let mut config = self.config.clone().from_env(ctx);
        // An identity picked in code must not be overridden by one from the env.
        if self.config.object_id.is_some()
            || self.config.client_id.is_some()
            || self.config.msi_res_id.is_some()
        {
            config.object_id.clone_from(&self.config.object_id);
            config.client_id.clone_from(&self.config.client_id);
            config.msi_res_id.clone_from(&self.config.msi_res_id);
        }

        let token = get_access_token(ctx, &config).await?;

        Ok(Some(Credential::with_bearer_token(
            &token.access_token,
            Some(token.expires_at()?),
        )))
    }
}

async fn get_access_token(ctx: &Context, config: &Config) -> Result<AccessTokenResponse> {
    let endpoint = config
        .msi_endpoint
        .as_deref()
        .unwrap_or(AZURE_IMDS_ENDPOINT);

    // The serializer is not `Sync` and must be gone before the first await.
    let url = {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("api-version", "2018-02-01")
            .append_pair("resource", AZURE_STORAGE_RESOURCE);
        if let Some(object_id) = &config.object_id {
            query.append_pair("object_id", object_id);
        } else if let Some(client_id) = &config.client_id {
            query.append_pair("client_id", client_id);
        } else if let Some(msi_res_id) = &config.msi_res_id {
            query.append_pair("msi_res_id", msi_res_id);
        }
        format!("{endpoint}?{}", query.finish())
    };

    let mut req = http::Request::builder()
        .method(http::Method::GET)
        .uri(&url)
        .header("Metadata", "true");
    if let Some(msi_secret) = &config.msi_secret {
        req = req.header("X-IDENTITY-HEADER", msi_secret);
    }
    let req = req
        .body(bytes::Bytes::new())
        .map_err(|e| Error::request_invalid("failed to build IMDS request").with_source(e))?;

    debug!("requesting managed identity token from {endpoint}");
    let resp = ctx.http_send(req).await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = String::from_utf8_lossy(resp.body());
        return Err(Error::credential_denied(format!(
            "IMDS request failed with status {status}: {body}"
        )));
    }

    serde_json::from_slice(resp.body())
        .map_err(|e| Error::unexpected("failed to parse IMDS response").with_source(e))
}
