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

use datastore_azure_storage::{Credential, ImdsCredentialProvider};
use datastore_core::{ErrorKind, ProvideCredential};
use pretty_assertions::assert_eq;

use super::{context, TokenEndpoint};

#[tokio::test]
async fn test_system_assigned_identity() {
    let http = TokenEndpoint::ok(
        r#"{"access_token":"imds-token","expires_on":"4102444800","resource":"https://storage.azure.com/","token_type":"Bearer"}"#,
    );
    let ctx = context(http.clone(), &[]);

    let cred = ImdsCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    match cred {
        Credential::BearerToken { token, expires_in } => {
            assert_eq!(token, "imds-token");
            assert_eq!(expires_in.unwrap().timestamp(), 4102444800);
        }
        _ => panic!("Expected BearerToken credential"),
    }

    let req = http.last_request();
    assert_eq!(
        req.uri().to_string(),
        "http://169.254.169.254/metadata/identity/oauth2/token?api-version=2018-02-01&resource=https%3A%2F%2Fstorage.azure.com%2F"
    );
    assert_eq!(req.headers()["Metadata"], "true");
}

#[tokio::test]
async fn test_user_assigned_identity_wins_over_env() {
    let http = TokenEndpoint::ok(r#"{"access_token":"imds-token","expires_on":"4102444800"}"#);
    let ctx = context(
        http.clone(),
        &[
            ("AZURE_OBJECT_ID", "object-from-env"),
            ("AZURE_MSI_ENDPOINT", "http://localhost:42356/msi/token"),
            ("AZURE_MSI_SECRET", "identity-secret"),
        ],
    );

    ImdsCredentialProvider::new()
        .with_client_id("client-from-code")
        .provide_credential(&ctx)
        .await
        .unwrap();

    let req = http.last_request();
    let query = req.uri().query().unwrap();
    assert!(query.ends_with("&client_id=client-from-code"), "{query}");
    assert!(!query.contains("object_id"));
    assert_eq!(req.uri().host(), Some("localhost"));
    assert_eq!(req.headers()["X-IDENTITY-HEADER"], "identity-secret");
}

#[tokio::test]
async fn test_imds_failure() {
    let http = TokenEndpoint::failing(400, r#"{"error":"invalid_request"}"#);
    let ctx = context(http, &[]);

    let err = ImdsCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialDenied);
}

#[tokio::test]
async fn test_imds_runs_on_spawned_task() {
    let http = TokenEndpoint::ok(r#"{"access_token":"imds-token","expires_on":"4102444800"}"#);
    let ctx = context(http.clone(), &[]);

    let cred = tokio::spawn(async move {
        ImdsCredentialProvider::new()
            .with_client_id("client-from-code")
            .provide_credential(&ctx)
            .await
    })
    .await
    .unwrap()
    .unwrap();
    assert!(cred.is_some());
    assert!(http
        .last_request()
        .uri()
        .query()
        .unwrap()
        .ends_with("&client_id=client-from-code"));
}
