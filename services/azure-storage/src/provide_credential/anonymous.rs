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

use crate::Credential;

/// AnonymousCredentialProvider always hands out [`Credential::Anonymous`].
///
/// Requests signed with it carry no authorization at all, which is what
/// public containers expect.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousCredentialProvider;

impl AnonymousCredentialProvider {
    /// Create a new anonymous provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for AnonymousCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(Credential::Anonymous))
    }
}
