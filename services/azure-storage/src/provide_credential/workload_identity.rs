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
use datastore_core::{Context, ProvideCredential, Result};
use log::debug;

use super::request_aad_token;
use crate::constants::{AZURE_PUBLIC_CLOUD, AZURE_STORAGE_SCOPE};
use crate::{Config, Credential};

/// Load credential from Azure Workload Identity.
///
/// This loader implements the Azure Workload Identity authentication flow,
/// which allows workloads running in Kubernetes to authenticate to Azure services
/// using a federated token.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/aks/workload-identity-overview>
#[derive(Debug, Default, Clone)]
pub struct WorkloadIdentityCredentialProvider {
    config: Config,
}

impl WorkloadIdentityCredentialProvider {
    /// Create a new workload identity loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader using the AAD fields of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the tenant ID.
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.config.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the client ID.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    /// Set the path of the federated token file.
    pub fn with_federated_token_file(mut self, path: impl Into<String>) -> Self {
        self.config.federated_token_file = Some(path.into());
        self
    }

    /// Set the authority host, defaults to the public cloud.
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.config.authority_host = Some(authority_host.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for WorkloadIdentityCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.clone().from_env(ctx);

        let (Some(tenant_id), Some(client_id), Some(federated_token_file)) = (
            config.tenant_id.as_deref(),
            config.client_id.as_deref(),
            config.federated_token_file.as_deref(),
        ) else {
            return Ok(None);
        };
        let authority_host = config
            .authority_host
            .as_deref()
            .unwrap_or(AZURE_PUBLIC_CLOUD);

        let federated_token = match ctx.file_read_as_string(federated_token_file).await {
            Ok(content) => content,
            Err(e) => {
                debug!("federated token file {federated_token_file} is not readable: {e}");
                return Ok(None);
            }
        };
        if federated_token.trim().is_empty() {
            return Ok(None);
        }

        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", AZURE_STORAGE_SCOPE)
            .append_pair("client_id", client_id)
            .append_pair(
                "client_assertion_type",
                "urn:ietf:params:oauth:client-assertion-type:jwt-bearer",
            )
            .append_pair("client_assertion", federated_token.trim())
            .append_pair("grant_type", "client_credentials")
            .finish();

        let token = request_aad_token(ctx, authority_host, tenant_id, form).await?;
        debug!("loaded bearer token for client {client_id} from workload identity");

        Ok(Some(Credential::with_bearer_token(
            &token.access_token,
            Some(token.expires_at()?),
        )))
    }
}
