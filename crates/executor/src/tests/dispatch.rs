//! Dispatch tests: payloads routed to get/set/del and the shape of each result.

use serde_json::{json, Value};

use super::create_test_executor;
use crate::{DatasetKey, Output};

fn body(output: &Output) -> Value {
    serde_json::to_value(output).unwrap()
}

// =============================================================================
// Set then Get
// =============================================================================

#[tokio::test]
async fn test_set_returns_key_and_get_returns_record() {
    let (executor, _, _) = create_test_executor().await;

    let out = executor
        .execute_payload(&json!({"set": {"key": "u1", "name": "Ann"}}))
        .await
        .unwrap();
    assert_eq!(out, Output::Key(DatasetKey::Simple("u1".into())));
    assert_eq!(body(&out), json!("u1"));

    let out = executor.execute_payload(&json!({"get": "u1"})).await.unwrap();
    assert_eq!(
        body(&out),
        json!({
            "key": "u1",
            "name": "Ann",
            "created_at": "2024-01-01T00:00:00.000Z",
            "updated_at": "2024-01-01T00:00:00.000Z"
        })
    );
}

#[tokio::test]
async fn test_get_missing_key_is_null_not_array() {
    let (executor, _, _) = create_test_executor().await;
    let out = executor.execute_payload(&json!({"get": "nobody"})).await.unwrap();
    assert_eq!(out, Output::MaybeRecord(None));
    assert_eq!(body(&out), Value::Null);
}

#[tokio::test]
async fn test_composite_key_roundtrip_through_store() {
    let (executor, store, _) = create_test_executor().await;

    let out = executor
        .execute_payload(&json!({"set": {"key": ["org", "u1"], "role": "admin"}}))
        .await
        .unwrap();
    assert_eq!(body(&out), json!(["org", "u1"]));

    // Persisted under the joined identifier, without a `key` field.
    use docgate_storage::DocumentStore;
    let doc = store.find_one("datasets", "org,u1").await.unwrap().unwrap();
    assert!(!doc.contains_key("key"));
    assert_eq!(doc["role"], json!("admin"));

    let out = executor
        .execute_payload(&json!({"get": ["org", "u1"]}))
        .await
        .unwrap();
    assert_eq!(body(&out)["key"], json!(["org", "u1"]));
}

// =============================================================================
// Filter queries
// =============================================================================

#[tokio::test]
async fn test_filter_returns_all_matches() {
    let (executor, _, _) = create_test_executor().await;
    for (key, team) in [("b", "red"), ("a", "red"), ("c", "blue")] {
        executor
            .execute_payload(&json!({"set": {"key": key, "team": team}}))
            .await
            .unwrap();
    }

    let out = executor
        .execute_payload(&json!({"get": {"team": "red"}}))
        .await
        .unwrap();
    let Output::Records(records) = &out else {
        panic!("expected records, got {out:?}");
    };
    let keys: Vec<&Value> = records.iter().map(|r| &r["key"]).collect();
    assert_eq!(keys, vec![&json!("a"), &json!("b")]);

    let out = executor
        .execute_payload(&json!({"get": {"team": "green"}}))
        .await
        .unwrap();
    assert_eq!(body(&out), json!([]));
}

#[tokio::test]
async fn test_filter_addresses_store_identifier() {
    let (executor, _, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1"}}))
        .await
        .unwrap();

    let out = executor
        .execute_payload(&json!({"get": {"_id": "u1"}}))
        .await
        .unwrap();
    assert_eq!(body(&out).as_array().unwrap().len(), 1);

    let out = executor
        .execute_payload(&json!({"get": {"key": "u1"}}))
        .await
        .unwrap();
    assert_eq!(body(&out), json!([]));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_returns_record_then_removes_it() {
    let (executor, _, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1", "name": "Ann"}}))
        .await
        .unwrap();

    let out = executor.execute_payload(&json!({"del": "u1"})).await.unwrap();
    assert_eq!(body(&out)["name"], json!("Ann"));
    assert_eq!(body(&out)["key"], json!("u1"));

    let out = executor.execute_payload(&json!({"get": "u1"})).await.unwrap();
    assert_eq!(out, Output::MaybeRecord(None));
}

#[tokio::test]
async fn test_delete_missing_key_is_null() {
    let (executor, _, _) = create_test_executor().await;
    let out = executor.execute_payload(&json!({"del": "ghost"})).await.unwrap();
    assert_eq!(out, Output::MaybeRecord(None));
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn test_store_field_selects_collection() {
    let (executor, store, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1"}, "store": "people"}))
        .await
        .unwrap();

    assert_eq!(store.len("people"), 1);
    assert!(store.is_empty(executor.default_collection()));

    let out = executor.execute_payload(&json!({"get": "u1"})).await.unwrap();
    assert_eq!(out, Output::MaybeRecord(None));
    let out = executor
        .execute_payload(&json!({"get": "u1", "store": "people"}))
        .await
        .unwrap();
    assert!(matches!(out, Output::MaybeRecord(Some(_))));
}
