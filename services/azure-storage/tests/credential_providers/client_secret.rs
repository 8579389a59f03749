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

use datastore_azure_storage::{ClientSecretCredentialProvider, Credential};
use datastore_core::ProvideCredential;

use super::{context, TokenEndpoint};

#[tokio::test]
async fn test_client_secret_from_env() {
    let http = TokenEndpoint::ok(
        r#"{"token_type":"Bearer","expires_in":3599,"ext_expires_in":3599,"access_token":"aad-token"}"#,
    );
    let ctx = context(
        http.clone(),
        &[
            ("AZURE_TENANT_ID", "contoso"),
            ("AZURE_CLIENT_ID", "app"),
            ("AZURE_CLIENT_SECRET", "s3cr3t"),
            ("AZURE_AUTHORITY_HOST", "https://login.example.com/"),
        ],
    );

    let cred = ClientSecretCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    match cred {
        Credential::BearerToken { token, expires_in } => {
            assert_eq!(token, "aad-token");
            assert!(expires_in.is_some());
        }
        _ => panic!("Expected BearerToken credential"),
    }

    let req = http.last_request();
    assert_eq!(
        req.uri().to_string(),
        "https://login.example.com/contoso/oauth2/v2.0/token"
    );
    let body = String::from_utf8(req.body().to_vec()).unwrap();
    assert!(body.contains("client_secret=s3cr3t"));
    assert!(body.contains("grant_type=client_credentials"));
    assert!(body.contains("scope=https%3A%2F%2Fstorage.azure.com%2F.default"));
}

#[tokio::test]
async fn test_client_secret_not_configured() {
    let http = TokenEndpoint::ok("{}");
    let ctx = context(http.clone(), &[("AZURE_TENANT_ID", "contoso")]);

    let cred = ClientSecretCredentialProvider::new()
        .with_client_id("app")
        .provide_credential(&ctx)
        .await
        .unwrap();

    assert!(cred.is_none());
    assert!(http.requests.lock().unwrap().is_empty());
}
