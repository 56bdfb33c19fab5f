//! Command enum defining the gateway's operations.
//!
//! A command is the typed form of a payload that has passed validation:
//! - exactly one operation
//! - every key checked against the key grammar
//! - the optional collection name already extracted

use docgate_core::{DatasetKey, Document, Record, KEY_FIELD};
use serde_json::{Map, Value};

use crate::validate::check;
use crate::{Error, Result};

/// What a `get` looks up
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// One record by key
    Key(DatasetKey),
    /// Every record matching a raw store filter
    Filter(Document),
}

/// A validated operation.
///
/// # Collection field
///
/// `store` names the collection. When `None` the executor uses its default
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Read by key or filter.
    /// Returns: `Output::Records` for a filter, `Output::MaybeRecord` for a key
    Get {
        /// Collection name
        store: Option<String>,
        /// Lookup target
        target: Target,
    },

    /// Upsert a record.
    /// Returns: `Output::Key`
    Set {
        /// Collection name
        store: Option<String>,
        /// The record, including its `key`
        record: Record,
    },

    /// Delete by key.
    /// Returns: `Output::MaybeRecord` holding the removed record
    Del {
        /// Collection name
        store: Option<String>,
        /// Key to delete
        key: DatasetKey,
    },
}

const OPERATIONS: [&str; 3] = ["get", "set", "del"];

impl Command {
    /// Decode an untrusted payload.
    ///
    /// The payload must be an object carrying exactly one of `get`, `set`,
    /// `del` and must pass [`check`](crate::check).
    pub fn from_payload(payload: &Value) -> Result<Command> {
        let map = payload
            .as_object()
            .ok_or_else(|| Error::invalid_request("payload must be an object"))?;
        Self::from_map(map)
    }

    /// Decode an untrusted payload object.
    pub fn from_map(map: &Map<String, Value>) -> Result<Command> {
        let present: Vec<&str> = OPERATIONS
            .iter()
            .copied()
            .filter(|op| map.contains_key(*op))
            .collect();
        if present.len() != 1 {
            return Err(Error::invalid_request(format!(
                "exactly one of get/set/del is required, found {}",
                present.len()
            )));
        }
        check(map)?;

        let store = map.get("store").and_then(Value::as_str).map(str::to_string);
        let command = match present[0] {
            "get" => {
                let operand = &map["get"];
                let target = match operand.as_object() {
                    Some(filter) => Target::Filter(filter.clone()),
                    None => Target::Key(DatasetKey::from_value(operand)?),
                };
                Command::Get { store, target }
            }
            "set" => {
                let record = map["set"]
                    .as_object()
                    .cloned()
                    .ok_or_else(|| Error::invalid_request("'set' must be an object"))?;
                Command::Set { store, record }
            }
            _ => Command::Del {
                store,
                key: DatasetKey::from_value(&map["del"])?,
            },
        };
        Ok(command)
    }

    /// Collection named by the command, if any
    pub fn store(&self) -> Option<&str> {
        match self {
            Command::Get { store, .. } | Command::Set { store, .. } | Command::Del { store, .. } => {
                store.as_deref()
            }
        }
    }

    /// Operation name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Set { .. } => "set",
            Command::Del { .. } => "del",
        }
    }

    /// Key the command targets, if it targets one
    pub fn key(&self) -> Option<DatasetKey> {
        match self {
            Command::Get {
                target: Target::Key(key),
                ..
            }
            | Command::Del { key, .. } => Some(key.clone()),
            Command::Get { .. } => None,
            Command::Set { record, .. } => record
                .get(KEY_FIELD)
                .and_then(|k| DatasetKey::from_value(k).ok()),
        }
    }
}
