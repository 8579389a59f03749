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

mod anonymous;
pub use anonymous::AnonymousCredentialProvider;

mod client_secret;
pub use client_secret::ClientSecretCredentialProvider;

mod config;
pub use config::ConfigCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod imds;
pub use imds::ImdsCredentialProvider;

mod static_provider;
pub use static_provider::StaticCredentialProvider;

mod workload_identity;
pub use workload_identity::WorkloadIdentityCredentialProvider;

use datastore_core::time::{now, DateTime};
use datastore_core::{Error, Result};

/// Token responses from AAD carry either `expires_in` (seconds from now),
/// `expires_on` as unix seconds, or `expires_on` as RFC3339 on some hosts.
#[derive(serde::Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default, deserialize_with = "de_string_or_number")]
    expires_in: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_number")]
    expires_on: Option<String>,
}

impl AccessTokenResponse {
    fn expires_at(&self) -> Result<DateTime> {
        if let Some(v) = self.expires_on.as_deref().filter(|v| !v.is_empty()) {
            return datastore_core::time::parse_timestamp(v)
                .or_else(|_| datastore_core::time::parse_rfc3339(v));
        }

        if let Some(v) = self.expires_in.as_deref().filter(|v| !v.is_empty()) {
            let secs: i64 = v.trim().parse().map_err(|e| {
                Error::unexpected(format!("invalid expires_in {v}")).with_source(anyhow::Error::new(e))
            })?;
            return Ok(now() + chrono::TimeDelta::seconds(secs));
        }

        // Neither present: assume a short lifetime so the token gets refreshed soon.
        Ok(now() + chrono::TimeDelta::minutes(10))
    }
}

fn de_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    let v: Option<StringOrNumber> = serde::Deserialize::deserialize(deserializer)?;
    Ok(v.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// Exchange a form body for an AAD access token at `{authority_host}/{tenant_id}/oauth2/v2.0/token`.
async fn request_aad_token(
    ctx: &datastore_core::Context,
    authority_host: &str,
    tenant_id: &str,
    form: String,
) -> Result<AccessTokenResponse> {
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    );

    let req = http::Request::builder()
        .method(http::Method::POST)
        .uri(&url)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(bytes::Bytes::from(form))
        .map_err(|e| Error::request_invalid("failed to build token request").with_source(e))?;

    let resp = ctx.http_send(req).await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = String::from_utf8_lossy(resp.body());
        return Err(Error::credential_denied(format!(
            "token request to {url} failed with status {status}: {body}"
        )));
    }

    serde_json::from_slice(resp.body())
        .map_err(|e| Error::unexpected("failed to parse token response").with_source(e))
}
