//! Upsert tests: timestamps, field removal and overwrite rules.

use docgate_storage::DocumentStore;
use serde_json::json;

use super::create_test_executor;

#[tokio::test]
async fn test_create_stamps_equal_timestamps() {
    let (executor, store, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1"}}))
        .await
        .unwrap();

    let doc = store.find_one("datasets", "u1").await.unwrap().unwrap();
    assert_eq!(doc["created_at"], doc["updated_at"]);
    assert_eq!(doc["created_at"], json!("2024-01-01T00:00:00.000Z"));
}

#[tokio::test]
async fn test_second_set_moves_only_updated_at() {
    let (executor, store, clock) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1", "n": 1}}))
        .await
        .unwrap();

    clock.advance_secs(90);
    executor
        .execute_payload(&json!({"set": {"key": "u1", "n": 2}}))
        .await
        .unwrap();

    let doc = store.find_one("datasets", "u1").await.unwrap().unwrap();
    assert_eq!(doc["n"], json!(2));
    assert_eq!(doc["created_at"], json!("2024-01-01T00:00:00.000Z"));
    assert_eq!(doc["updated_at"], json!("2024-01-01T00:01:30.000Z"));
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let (executor, store, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "u1", "name": "Ann", "age": 30}}))
        .await
        .unwrap();
    executor
        .execute_payload(&json!({"set": {"key": "u1", "age": 31}}))
        .await
        .unwrap();

    let doc = store.find_one("datasets", "u1").await.unwrap().unwrap();
    assert_eq!(doc["name"], json!("Ann"));
    assert_eq!(doc["age"], json!(31));
}

#[tokio::test]
async fn test_empty_string_removes_field() {
    let (executor, _, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "a", "field": "x", "other": 1}}))
        .await
        .unwrap();
    executor
        .execute_payload(&json!({"set": {"key": "a", "field": ""}}))
        .await
        .unwrap();

    let out = executor.execute_payload(&json!({"get": "a"})).await.unwrap();
    let record = serde_json::to_value(&out).unwrap();
    assert!(record.get("field").is_none(), "field should be absent: {record}");
    assert_eq!(record["other"], json!(1));
}

#[tokio::test]
async fn test_empty_string_on_create_is_not_written() {
    let (executor, store, _) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "a", "blank": ""}}))
        .await
        .unwrap();
    let doc = store.find_one("datasets", "a").await.unwrap().unwrap();
    assert!(!doc.contains_key("blank"));
}

#[tokio::test]
async fn test_caller_cannot_overwrite_created_at() {
    let (executor, store, clock) = create_test_executor().await;
    executor
        .execute_payload(&json!({"set": {"key": "a", "created_at": "1999-01-01T00:00:00.000Z"}}))
        .await
        .unwrap();
    let doc = store.find_one("datasets", "a").await.unwrap().unwrap();
    assert_eq!(doc["created_at"], json!("2024-01-01T00:00:00.000Z"));

    clock.advance_secs(1);
    for forged in [json!("1999-01-01T00:00:00.000Z"), json!("")] {
        executor
            .execute_payload(&json!({"set": {"key": "a", "created_at": forged}}))
            .await
            .unwrap();
        let doc = store.find_one("datasets", "a").await.unwrap().unwrap();
        assert_eq!(doc["created_at"], json!("2024-01-01T00:00:00.000Z"));
    }
}

#[tokio::test]
async fn test_set_does_not_alias_caller_record() {
    let (executor, store, _) = create_test_executor().await;
    let payload = json!({"set": {"key": "a", "nested": {"v": 1}}});
    executor.execute_payload(&payload).await.unwrap();

    assert_eq!(payload, json!({"set": {"key": "a", "nested": {"v": 1}}}));
    let doc = store.find_one("datasets", "a").await.unwrap().unwrap();
    assert_eq!(doc["nested"], json!({"v": 1}));
}
