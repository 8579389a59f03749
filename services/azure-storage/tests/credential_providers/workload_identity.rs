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

use std::io::Write;

use datastore_azure_storage::{Credential, WorkloadIdentityCredentialProvider};
use datastore_core::ProvideCredential;

use super::{context, TokenEndpoint};

#[tokio::test]
async fn test_workload_identity() {
    let mut token_file = tempfile::NamedTempFile::new().unwrap();
    token_file.write_all(b"federated-jwt\n").unwrap();

    let http = TokenEndpoint::ok(r#"{"access_token":"aad-token","expires_in":3599}"#);
    let ctx = context(
        http.clone(),
        &[
            ("AZURE_TENANT_ID", "contoso"),
            ("AZURE_CLIENT_ID", "app"),
            (
                "AZURE_FEDERATED_TOKEN_FILE",
                token_file.path().to_str().unwrap(),
            ),
        ],
    );

    let cred = WorkloadIdentityCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(cred, Credential::BearerToken { ref token, .. } if token == "aad-token"));

    let req = http.last_request();
    assert_eq!(
        req.uri().to_string(),
        "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
    );
    let body = String::from_utf8(req.body().to_vec()).unwrap();
    assert!(body.contains("client_assertion=federated-jwt&"));
}

#[tokio::test]
async fn test_missing_token_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("token");

    let http = TokenEndpoint::ok("{}");
    let ctx = context(http.clone(), &[]);

    let cred = WorkloadIdentityCredentialProvider::new()
        .with_tenant_id("contoso")
        .with_client_id("app")
        .with_federated_token_file(missing.to_str().unwrap())
        .provide_credential(&ctx)
        .await
        .unwrap();

    assert!(cred.is_none());
    assert!(http.requests.lock().unwrap().is_empty());
}
