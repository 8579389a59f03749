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

mod fake;

use datastore_azure_table::{
    ContinuationToken, DynamicEntity, TableEntity, TableServiceClient, TableStorageRepository,
};
use datastore_core::ErrorKind;
use fake::FakeTableService;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

async fn repository(fake: &FakeTableService) -> TableStorageRepository<DynamicEntity> {
    let repo = TableStorageRepository::from_endpoint(fake.endpoint()).unwrap();
    repo.create_table("people").await.unwrap();
    repo
}

fn person(team: &str, email: &str, age: i64) -> DynamicEntity {
    DynamicEntity::new(team, email)
        .with_property("Age", age)
        .with_property("Active", true)
}

#[tokio::test]
async fn test_insert_then_get() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    let mut alice = person("team-a", "alice@example.com", 42);
    repo.insert("people", &mut alice).await.unwrap();
    assert!(alice.etag.is_some());

    let got = repo
        .get("people", "team-a", "alice@example.com")
        .await
        .unwrap();
    assert_eq!(got.partition_key, alice.partition_key);
    assert_eq!(got.row_key, alice.row_key);
    assert_eq!(got.properties, alice.properties);
    assert_eq!(got.etag, alice.etag);
    assert!(got.timestamp.is_some());
}

#[tokio::test]
async fn test_insert_existing_key_conflicts_and_upsert_replaces() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    repo.insert("people", &mut person("team-a", "bob", 30))
        .await
        .unwrap();

    let err = repo
        .insert("people", &mut person("team-a", "bob", 31))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let mut replacement = DynamicEntity::new("team-a", "bob").with_property("Nickname", "bobby");
    repo.upsert("people", &mut replacement).await.unwrap();

    let got = repo.get("people", "team-a", "bob").await.unwrap();
    assert_eq!(got.property("Nickname"), Some(&json!("bobby")));
    assert_eq!(got.property("Age"), None);
}

#[tokio::test]
async fn test_upsert_inserts_missing_entity() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    repo.upsert("people", &mut person("team-b", "carol", 25))
        .await
        .unwrap();
    let got = repo.get("people", "team-b", "carol").await.unwrap();
    assert_eq!(got.property("Age"), Some(&json!(25)));
}

#[tokio::test]
async fn test_update_checks_etag() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    repo.insert("people", &mut person("team-a", "dave", 50))
        .await
        .unwrap();

    let mut current = repo.get("people", "team-a", "dave").await.unwrap();
    let mut stale = current.clone();
    let read_etag = current.etag.clone();

    current.properties.insert("Age".to_string(), json!(51));
    repo.update("people", &mut current).await.unwrap();
    assert_ne!(current.etag, read_etag);

    stale.properties.insert("Age".to_string(), json!(99));
    let err = repo.update("people", &mut stale).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

    let got = repo.get("people", "team-a", "dave").await.unwrap();
    assert_eq!(got.property("Age"), Some(&json!(51)));
    assert_eq!(got.etag, current.etag);
}

#[tokio::test]
async fn test_update_keeps_property_types() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    let mut account = DynamicEntity::new("team-a", "grace")
        .with_property("Balance@odata.type", "Edm.Int64")
        .with_property("Balance", "9007199254740993")
        .with_property("OpenedAt@odata.type", "Edm.DateTime")
        .with_property("OpenedAt", "2024-03-01T08:12:34Z");
    repo.insert("people", &mut account).await.unwrap();

    let mut current = repo.get("people", "team-a", "grace").await.unwrap();
    assert_eq!(
        current.property("Balance@odata.type"),
        Some(&json!("Edm.Int64"))
    );
    current
        .properties
        .insert("Balance".to_string(), json!("9007199254740994"));
    repo.update("people", &mut current).await.unwrap();

    let got = repo.get("people", "team-a", "grace").await.unwrap();
    assert_eq!(got.property("Balance@odata.type"), Some(&json!("Edm.Int64")));
    assert_eq!(got.property("Balance"), Some(&json!("9007199254740994")));
    assert_eq!(
        got.property("OpenedAt@odata.type"),
        Some(&json!("Edm.DateTime"))
    );
    assert_eq!(got.property("Timestamp@odata.type"), None);
}

#[tokio::test]
async fn test_update_without_etag_sends_nothing() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    let sent = fake.requests();

    let err = repo
        .update("people", &mut person("team-a", "erin", 20))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(fake.requests(), sent);
}

#[tokio::test]
async fn test_get_missing_entity_is_not_found() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    let err = repo.get("people", "team-a", "nobody").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    repo.insert("people", &mut person("team-a", "frank", 33))
        .await
        .unwrap();

    repo.delete("people", "team-a", "frank").await.unwrap();
    let err = repo.get("people", "team-a", "frank").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    repo.delete("people", "team-a", "frank").await.unwrap();
}

#[tokio::test]
async fn test_table_lifecycle() {
    let fake = FakeTableService::default();
    let repo = TableStorageRepository::<DynamicEntity>::from_endpoint(fake.endpoint()).unwrap();

    repo.create_table("audit").await.unwrap();
    repo.create_table("audit").await.unwrap();
    assert!(fake.has_table("audit"));

    repo.delete_table("audit").await.unwrap();
    assert!(!fake.has_table("audit"));

    let err = repo.delete_table("audit").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_table_reports_creation() {
    let fake = FakeTableService::default();
    let client = TableServiceClient::new(fake.endpoint()).unwrap();

    assert!(client.create_table("audit").await.unwrap());
    assert!(!client.create_table("audit").await.unwrap());
}

#[tokio::test]
async fn test_keys_with_quotes_and_spaces() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    let mut entity = person("O'Brien & sons", "a/b c?d", 70);
    repo.upsert("people", &mut entity).await.unwrap();

    let got = repo
        .get("people", "O'Brien & sons", "a/b c?d")
        .await
        .unwrap();
    assert_eq!(got.row_key, "a/b c?d");

    let items = repo
        .query("people", "PartitionKey eq 'O''Brien & sons'")
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

async fn seed(repo: &TableStorageRepository<DynamicEntity>) {
    for (team, count) in [("team-a", 4), ("team-b", 3)] {
        for idx in 0..count {
            repo.insert("people", &mut person(team, &format!("user-{idx}"), idx))
                .await
                .unwrap();
        }
    }
}

fn keys(items: &[DynamicEntity]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|e| (e.partition_key.clone(), e.row_key.clone()))
        .collect()
}

#[tokio::test]
async fn test_query_follows_every_page() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    seed(&repo).await;

    let all = repo.query("people", "").await.unwrap();
    assert_eq!(all.len(), 7);

    let blank = repo.query("people", "   ").await.unwrap();
    assert_eq!(keys(&blank), keys(&all));

    let team_b = repo
        .query("people", "PartitionKey eq 'team-b'")
        .await
        .unwrap();
    assert_eq!(
        keys(&team_b),
        vec![
            ("team-b".to_string(), "user-0".to_string()),
            ("team-b".to_string(), "user-1".to_string()),
            ("team-b".to_string(), "user-2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_paging_matches_query() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    seed(&repo).await;

    let expected = repo.query("people", "").await.unwrap();

    let mut paged = Vec::new();
    let mut pages = 0;
    let mut continuation: Option<ContinuationToken> = None;
    loop {
        let page = repo
            .query_paged("people", "", 3, continuation.as_ref())
            .await
            .unwrap();
        assert!(page.items.len() <= 3);
        pages += 1;
        paged.extend(page.items);
        match page.continuation {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(keys(&paged), keys(&expected));
    assert_eq!(paged, expected);
}

#[tokio::test]
async fn test_paging_resumes_from_token_string() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;
    seed(&repo).await;

    let first = repo
        .query_paged("people", "PartitionKey eq 'team-a'", 2, None)
        .await
        .unwrap();
    assert!(first.has_more());

    let saved = first.continuation.unwrap().to_string();
    let token: ContinuationToken = saved.parse().unwrap();
    let second = repo
        .query_paged("people", "PartitionKey eq 'team-a'", 2, Some(&token))
        .await
        .unwrap();

    assert_eq!(
        keys(&second.items),
        vec![
            ("team-a".to_string(), "user-2".to_string()),
            ("team-a".to_string(), "user-3".to_string()),
        ]
    );
    assert_eq!(second.continuation, None);
}

#[tokio::test]
async fn test_zero_page_size_is_rejected() {
    let fake = FakeTableService::default();
    let repo = repository(&fake).await;

    let err = repo.query_paged("people", "", 0, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
}

#[tokio::test]
async fn test_missing_table() {
    let fake = FakeTableService::default();
    let repo = TableStorageRepository::<DynamicEntity>::from_endpoint(fake.endpoint()).unwrap();

    let err = repo.query("ghosts", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = repo
        .insert("ghosts", &mut person("p", "r", 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    #[serde(rename = "PartitionKey")]
    customer: String,
    #[serde(rename = "RowKey")]
    id: String,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Status")]
    status: String,
    #[serde(skip)]
    etag: Option<String>,
}

impl TableEntity for Order {
    fn partition_key(&self) -> &str {
        &self.customer
    }

    fn row_key(&self) -> &str {
        &self.id
    }

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn set_etag(&mut self, etag: Option<String>) {
        self.etag = etag;
    }
}

#[tokio::test]
async fn test_typed_entity() {
    let fake = FakeTableService::default();
    let repo = TableStorageRepository::<Order>::from_endpoint(fake.endpoint()).unwrap();
    repo.create_table("orders").await.unwrap();

    let mut order = Order {
        customer: "c-1".to_string(),
        id: "o-1".to_string(),
        total: 12.5,
        status: "paid".to_string(),
        etag: None,
    };
    repo.insert("orders", &mut order).await.unwrap();

    let got = repo.get("orders", "c-1", "o-1").await.unwrap();
    assert_eq!(got, order);

    let orders = repo.query("orders", "RowKey eq 'o-1'").await.unwrap();
    assert_eq!(orders, vec![order]);
}
