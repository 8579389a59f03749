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

use std::time::Duration;

use bytes::Bytes;
use datastore_core::{Context, Error, ProvideCredentialChain, Result, Signer};
use http::header::{self, HeaderValue};
use http::{Request, Response, Uri};
use log::debug;

use crate::constants::X_MS_VERSION;
use crate::{
    AnonymousCredentialProvider, Config, ConfigCredentialProvider, Credential,
    DefaultCredentialProvider, ImdsCredentialProvider, RequestSigner, Service,
    StaticCredentialProvider,
};

/// Where the credential of a [`StorageEndpoint`] comes from.
///
/// Chosen once at start-up; the resulting provider is reloaded by the signer
/// whenever its credential expires.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Account key, SAS token, service principal, workload identity or the
    /// system-assigned managed identity, whichever the environment provides
    /// first.
    Default,
    /// A user-assigned managed identity, selected by its client id.
    ManagedIdentity {
        /// Client id of the identity.
        client_id: String,
    },
    /// The account key or SAS token embedded in a connection string.
    ///
    /// A connection string with neither falls back to anonymous access.
    ConnectionString(String),
    /// A credential already in hand.
    Static(Credential),
    /// No credential: requests are sent unsigned.
    Anonymous,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Default => f.write_str("Default"),
            CredentialSource::ManagedIdentity { client_id } => f
                .debug_struct("ManagedIdentity")
                .field("client_id", client_id)
                .finish(),
            CredentialSource::ConnectionString(v) => f
                .debug_tuple("ConnectionString")
                .field(&datastore_core::utils::Redact::from(v))
                .finish(),
            CredentialSource::Static(cred) => f.debug_tuple("Static").field(cred).finish(),
            CredentialSource::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// StorageEndpoint is one storage service of one account: its URL, the
/// service kind, a signer holding the chosen credential and the context used
/// for I/O.
///
/// Built once and cloned into every client; clones share the credential cache.
///
/// ```no_run
/// use datastore_azure_storage::{CredentialSource, Service, StorageEndpoint};
/// use datastore_core::Context;
/// use std::time::Duration;
///
/// # fn example(ctx: Context) -> datastore_core::Result<()> {
/// let endpoint = StorageEndpoint::new(
///     ctx,
///     "https://myaccount.blob.core.windows.net",
///     CredentialSource::ManagedIdentity {
///         client_id: "00000000-0000-0000-0000-000000000000".to_string(),
///     },
///     Service::Blob,
/// )?
/// .with_timeout(Duration::from_secs(30));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct StorageEndpoint {
    endpoint: String,
    service: Service,
    signer: Signer<Credential>,
    timeout: Option<Duration>,
}

impl StorageEndpoint {
    /// Create an endpoint for `endpoint`, e.g. `https://myaccount.table.core.windows.net`.
    ///
    /// A pre-signed endpoint such as `https://myaccount.blob.core.windows.net?sv=...&sig=...`
    /// is accepted together with [`CredentialSource::Anonymous`]: its query is
    /// used as the SAS token of every request.
    pub fn new(
        ctx: Context,
        endpoint: &str,
        source: CredentialSource,
        service: Service,
    ) -> Result<Self> {
        let (endpoint, sas_token) = normalize_endpoint(endpoint)?;
        let source = match (source, sas_token) {
            (source, None) => source,
            (CredentialSource::Anonymous, Some(sas_token)) => {
                CredentialSource::Static(Credential::with_sas_token(&sas_token))
            }
            (_, Some(_)) => {
                return Err(Error::config_invalid(format!(
                    "endpoint {endpoint} is pre-signed, use anonymous access with it"
                )))
            }
        };
        let request_signer = RequestSigner::new().with_service(service);

        let signer = match source {
            CredentialSource::Default => {
                Signer::new(ctx, DefaultCredentialProvider::new(), request_signer)
            }
            CredentialSource::ManagedIdentity { client_id } => Signer::new(
                ctx,
                ImdsCredentialProvider::new().with_client_id(client_id),
                request_signer,
            ),
            CredentialSource::ConnectionString(conn_str) => {
                let config = Config::try_from_connection_string(&conn_str, service)?;
                Signer::new(ctx, connection_string_provider(&config), request_signer)
            }
            CredentialSource::Static(credential) => Signer::new(
                ctx,
                StaticCredentialProvider::new(credential),
                request_signer,
            ),
            CredentialSource::Anonymous => {
                Signer::new(ctx, AnonymousCredentialProvider::new(), request_signer)
            }
        };

        debug!("created {service} endpoint {endpoint}");
        Ok(Self {
            endpoint,
            service,
            signer,
            timeout: None,
        })
    }

    /// Create an endpoint from a connection string, which carries both the
    /// endpoint and the credential.
    pub fn from_connection_string(ctx: Context, conn_str: &str, service: Service) -> Result<Self> {
        let config = Config::try_from_connection_string(conn_str, service)?;
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Err(Error::config_invalid(format!(
                "connection string has no {service} endpoint"
            )));
        };

        let mut this = Self::new(ctx, endpoint, CredentialSource::Anonymous, service)?;
        this.signer = this
            .signer
            .with_credential_provider(connection_string_provider(&config));
        Ok(this)
    }

    /// Bound every request, signing included, by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The service URL without a trailing `/`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The service kind.
    pub fn service(&self) -> Service {
        self.service
    }

    /// The per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The context requests are sent with.
    pub fn context(&self) -> &Context {
        self.signer.context()
    }

    /// Join an already-encoded path onto the endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Strip the endpoint off an absolute URL, returning the percent-decoded
    /// path below it.
    ///
    /// Fails with `RequestInvalid` when the URL does not belong to this endpoint.
    pub fn relative_path(&self, url: &str) -> Result<String> {
        let foreign = || {
            Error::request_invalid(format!(
                "{url} does not belong to endpoint {}",
                self.endpoint
            ))
        };
        let without_fragment = url.trim().split('#').next().unwrap_or_default();
        let uri: Uri = without_fragment
            .parse()
            .map_err(|e| foreign().with_source(e))?;
        let base: Uri = self.endpoint.parse().map_err(|e| foreign().with_source(e))?;

        // Scheme and host compare case-insensitively, the path does not.
        let same_scheme = match (uri.scheme_str(), base.scheme_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        let same_authority = match (uri.authority(), base.authority()) {
            (Some(a), Some(b)) => a.as_str().eq_ignore_ascii_case(b.as_str()),
            _ => false,
        };
        if !same_scheme || !same_authority {
            return Err(foreign());
        }

        let rest = uri
            .path()
            .strip_prefix(base.path().trim_end_matches('/'))
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(foreign)?;

        Ok(percent_encoding::percent_decode_str(rest)
            .decode_utf8_lossy()
            .into_owned())
    }

    /// Sign and send one request, returning whatever the service answered.
    ///
    /// Non-2xx responses are returned as `Ok`; use
    /// [`check_response`](crate::check_response) to map them.
    pub async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        match self.timeout {
            None => self.sign_and_send(req).await,
            Some(timeout) => tokio::time::timeout(timeout, self.sign_and_send(req))
                .await
                .map_err(|_| {
                    Error::transport(format!("request timed out after {timeout:?}"))
                })?,
        }
    }

    async fn sign_and_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_parts();

        if !parts.headers.contains_key(X_MS_VERSION) {
            parts.headers.insert(
                X_MS_VERSION,
                HeaderValue::from_static(self.service.api_version()),
            );
        }
        // Shared Key signs the length, so it has to be known before sending.
        if !body.is_empty() {
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        self.signer.sign(&mut parts).await?;

        let method = parts.method.clone();
        let uri = parts.uri.clone();
        let resp = self
            .context()
            .http_send(Request::from_parts(parts, body))
            .await?;
        debug!("{method} {} got {}", redact_query(&uri), resp.status());

        Ok(resp)
    }
}

/// Credentials from a connection string, or anonymous access if it has none.
fn connection_string_provider(config: &Config) -> ProvideCredentialChain<Credential> {
    ProvideCredentialChain::new()
        .push(ConfigCredentialProvider::from_config(config))
        .push(AnonymousCredentialProvider::new())
}

/// Split an endpoint into its URL without trailing `/` and its SAS query, if any.
fn normalize_endpoint(endpoint: &str) -> Result<(String, Option<String>)> {
    let (endpoint, sas_token) = match endpoint.trim().split_once('?') {
        Some((endpoint, query)) if !query.is_empty() => (endpoint, Some(query.to_string())),
        Some((endpoint, _)) => (endpoint, None),
        None => (endpoint.trim(), None),
    };
    let endpoint = endpoint.trim_end_matches('/');
    let uri: Uri = endpoint.parse().map_err(|e| {
        Error::config_invalid(format!("invalid endpoint {endpoint}")).with_source(e)
    })?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(Error::config_invalid(format!(
            "endpoint {endpoint} must be an absolute url"
        )));
    }

    Ok((endpoint.to_string(), sas_token))
}

/// SAS tokens travel in the query, keep them out of the logs.
fn redact_query(uri: &Uri) -> String {
    match uri.query() {
        Some(_) => format!("{}?***", uri.path()),
        None => uri.path().to_string(),
    }
}
