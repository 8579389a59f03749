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

use crate::{Config, Credential};

/// ConfigCredentialProvider turns the static parts of a [`Config`] into a credential.
///
/// A SAS token wins over an account key, the same precedence connection
/// strings use.
#[derive(Debug, Default, Clone)]
pub struct ConfigCredentialProvider {
    account_name: Option<String>,
    account_key: Option<String>,
    sas_token: Option<String>,
}

impl ConfigCredentialProvider {
    /// Create a provider with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from the account fields of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            account_name: config.account_name.clone(),
            account_key: config.account_key.clone(),
            sas_token: config.sas_token.clone(),
        }
    }

    /// Set the account name.
    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// Set the account key.
    pub fn with_account_key(mut self, account_key: impl Into<String>) -> Self {
        self.account_key = Some(account_key.into());
        self
    }

    /// Set the SAS token.
    pub fn with_sas_token(mut self, sas_token: impl Into<String>) -> Self {
        self.sas_token = Some(sas_token.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        if let Some(token) = self.sas_token.as_deref().filter(|v| !v.is_empty()) {
            return Ok(Some(Credential::with_sas_token(token)));
        }

        match (self.account_name.as_deref(), self.account_key.as_deref()) {
            (Some(name), Some(key)) if !name.is_empty() && !key.is_empty() => {
                Ok(Some(Credential::with_shared_key(name, key)))
            }
            _ => Ok(None),
        }
    }
}
