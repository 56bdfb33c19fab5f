//! Structural validation of raw request payloads.
//!
//! Rules, checked in order, first violation wins:
//! - `store`, if present, is a string
//! - `get`, if present, is a valid key or an object (a raw filter)
//! - `set`, if present, is an object whose `key` field is a valid key
//! - `del`, if present, is a valid key
//!
//! "Exactly one of get/set/del" is not checked here; [`Command::from_payload`]
//! enforces it.
//!
//! [`Command::from_payload`]: crate::Command::from_payload

use docgate_core::{DatasetKey, KEY_FIELD};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// True iff the payload passes every structural rule.
pub fn validate(payload: &Map<String, Value>) -> bool {
    check(payload).is_ok()
}

/// Like [`validate`], reporting the first violated rule.
pub fn check(payload: &Map<String, Value>) -> Result<()> {
    if let Some(store) = payload.get("store") {
        if !store.is_string() {
            return Err(Error::invalid_request("'store' must be a string"));
        }
    }

    if let Some(get) = payload.get("get") {
        if !get.is_object() {
            DatasetKey::from_value(get)?;
        }
    }

    if let Some(set) = payload.get("set") {
        let record = set
            .as_object()
            .ok_or_else(|| Error::invalid_request("'set' must be an object"))?;
        let key = record
            .get(KEY_FIELD)
            .ok_or_else(|| Error::invalid_request("'set' has no 'key' field"))?;
        DatasetKey::from_value(key)?;
    }

    if let Some(del) = payload.get("del") {
        DatasetKey::from_value(del)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_accepts_well_formed_payloads() {
        assert!(validate(&payload(json!({"get": "u1"}))));
        assert!(validate(&payload(json!({"get": ["org", "u1"], "store": "people"}))));
        assert!(validate(&payload(json!({"get": {"name": "Ann"}}))));
        assert!(validate(&payload(json!({"set": {"key": "u1", "name": "Ann"}}))));
        assert!(validate(&payload(json!({"del": "u1"}))));
    }

    #[test]
    fn test_store_must_be_string() {
        assert!(!validate(&payload(json!({"get": "u1", "store": 3}))));
        assert!(!validate(&payload(json!({"get": "u1", "store": null}))));
    }

    #[test]
    fn test_get_operand() {
        assert!(!validate(&payload(json!({"get": "bad key!"}))));
        assert!(!validate(&payload(json!({"get": 12}))));
        assert!(!validate(&payload(json!({"get": ["a", {"b": 1}]}))));
    }

    #[test]
    fn test_set_operand() {
        assert!(!validate(&payload(json!({"set": "u1"}))));
        assert!(!validate(&payload(json!({"set": {"name": "Ann"}}))));
        assert!(!validate(&payload(json!({"set": {"key": "bad key!"}}))));
        assert!(!validate(&payload(json!({"set": {"key": 5}}))));
    }

    #[test]
    fn test_del_operand() {
        assert!(!validate(&payload(json!({"del": {"name": "Ann"}}))));
        assert!(!validate(&payload(json!({"del": "a b"}))));
    }

    #[test]
    fn test_first_violation_is_reported() {
        let err = check(&payload(json!({"store": 1, "del": "a b"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
        let err = check(&payload(json!({"store": "s", "del": "a b"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn test_exactly_one_is_not_checked_here() {
        assert!(validate(&payload(json!({}))));
        assert!(validate(&payload(json!({"get": "a", "del": "b"}))));
    }
}
