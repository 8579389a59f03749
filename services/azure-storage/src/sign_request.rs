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
use datastore_core::hash::{base64_decode, base64_hmac_sha256};
use datastore_core::time::{format_http_date, now, DateTime};
use datastore_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::{self, HeaderName, HeaderValue};
use http::request::Parts;
use log::debug;
use percent_encoding::percent_encode;

use crate::constants::{AZURE_QUERY_ENCODE_SET, CONTENT_MD5, X_MS_DATE};
use crate::{Credential, Service};

/// RequestSigner that implements Azure Storage Shared Key, SAS and bearer
/// token authorization.
///
/// Blob and Table disagree on the Shared Key string-to-sign, so the signer is
/// bound to one [`Service`].
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug)]
pub struct RequestSigner {
    service: Service,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for Azure Blob Storage.
    pub fn new() -> Self {
        Self {
            service: Service::Blob,
            time: None,
        }
    }

    /// Sign for the given service instead.
    pub fn with_service(mut self, service: Service) -> Self {
        self.service = service;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "no credential available to sign the request",
            ));
        };

        if let Credential::Anonymous = cred {
            return Ok(());
        }

        let mut ctx = SigningRequest::build(req)?;
        let now_time = self.time.unwrap_or_else(now);

        match cred {
            Credential::SasToken { token } => {
                ctx.query_append(token);
            }
            Credential::BearerToken { token, .. } => {
                ctx.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);
                ctx.headers
                    .insert(header::AUTHORIZATION, sensitive(format!("Bearer {token}"))?);
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => {
                ctx.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);

                let string_to_sign = match self.service {
                    Service::Blob => blob_string_to_sign(&ctx, account_name)?,
                    Service::Table => table_string_to_sign(&ctx, account_name)?,
                };
                debug!("string to sign: {}", &string_to_sign);

                let key = base64_decode(account_key).map_err(|e| {
                    Error::credential_invalid("account key is not valid base64").with_source(e)
                })?;
                let signature = base64_hmac_sha256(&key, string_to_sign.as_bytes());

                ctx.headers.insert(
                    header::AUTHORIZATION,
                    sensitive(format!("SharedKey {account_name}:{signature}"))?,
                );
            }
            Credential::Anonymous => {}
        }

        // Apply percent encoding for query parameters
        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}

fn sensitive(value: String) -> Result<HeaderValue> {
    let mut value: HeaderValue = value.parse()?;
    value.set_sensitive(true);
    Ok(value)
}

/// Construct string to sign for the Blob service
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn blob_string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let content_length = match ctx.header_get_or_default(&header::CONTENT_LENGTH)? {
        "0" => "",
        v => v,
    };

    let lines = [
        ctx.method.as_str(),
        ctx.header_get_or_default(&header::CONTENT_ENCODING)?,
        ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?,
        content_length,
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?,
        ctx.header_get_or_default(&header::CONTENT_TYPE)?,
        ctx.header_get_or_default(&header::DATE)?,
        ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?,
        ctx.header_get_or_default(&header::IF_MATCH)?,
        ctx.header_get_or_default(&header::IF_NONE_MATCH)?,
        ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?,
        ctx.header_get_or_default(&header::RANGE)?,
    ];

    let mut s = String::with_capacity(256);
    for line in lines {
        s.push_str(line);
        s.push('\n');
    }
    s.push_str(&canonicalize_header(ctx)?);
    s.push('\n');
    s.push_str(&canonicalize_blob_resource(ctx, account_name));

    Ok(s)
}

/// Construct string to sign for the Table service
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedResource;
/// ```
///
/// `Date` is the `x-ms-date` we set, since the table service accepts either.
///
/// ## Reference
///
/// - [Table service (Shared Key authorization)](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#table-service-shared-key-authorization)
fn table_string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(128);
    s.push_str(ctx.method.as_str());
    s.push('\n');
    s.push_str(ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?);
    s.push('\n');
    s.push_str(ctx.header_get_or_default(&header::CONTENT_TYPE)?);
    s.push('\n');
    s.push_str(ctx.header_get_or_default(&HeaderName::from_static(X_MS_DATE))?);
    s.push('\n');
    s.push_str(&canonicalize_table_resource(ctx, account_name));

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_blob_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_string(query, ":", "\n")
    )
}

/// The table service only keeps `comp` from the query.
fn canonicalize_table_resource(ctx: &SigningRequest, account_name: &str) -> String {
    let comp = ctx.query_to_vec_with_filter(|k| k == "comp");

    match comp.first() {
        Some((_, v)) => format!("/{}{}?comp={}", account_name, ctx.path, v),
        None => format!("/{}{}", account_name, ctx.path),
    }
}
