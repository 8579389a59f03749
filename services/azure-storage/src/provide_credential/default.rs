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
use datastore_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

use crate::{
    ClientSecretCredentialProvider, Config, ConfigCredentialProvider, Credential,
    EnvCredentialProvider, ImdsCredentialProvider, WorkloadIdentityCredentialProvider,
};

/// DefaultCredentialProvider tries every credential source a deployed service
/// usually has, in order:
///
/// - account key or SAS token (from a [`Config`] or the environment)
/// - client secret
/// - workload identity
/// - managed identity via IMDS
///
/// The first one that produces a credential wins.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ClientSecretCredentialProvider::new())
            .push(WorkloadIdentityCredentialProvider::new())
            .push(ImdsCredentialProvider::new());

        Self { chain }
    }
}

impl DefaultCredentialProvider {
    /// Create a new default loader reading everything from the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default loader seeded with `config`.
    ///
    /// Values in `config` take precedence; anything left unset still falls back
    /// to the environment.
    pub fn from_config(config: &Config) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(ConfigCredentialProvider::from_config(config))
            .push(EnvCredentialProvider::new())
            .push(ClientSecretCredentialProvider::from_config(config))
            .push(WorkloadIdentityCredentialProvider::from_config(config))
            .push(ImdsCredentialProvider::from_config(config));

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
