//! Dataset keys and their store identifiers
//!
//! A dataset key is either a single token or an ordered sequence of tokens.
//! Every token must match `[A-Za-z0-9_-]+`.
//!
//! ## Identifier encoding
//!
//! The document store only knows single-string identifiers, so composite keys
//! are joined with `,` and split again when read back:
//!
//! | Key | Store identifier |
//! |-----|------------------|
//! | `"u1"` | `"u1"` |
//! | `["org", "u1"]` | `"org,u1"` |
//!
//! There is no escaping. A token containing a comma would be indistinguishable
//! from a composite key, which is why the grammar forbids commas and why every
//! write path must validate keys first. Two consequences of the encoding are
//! accepted as-is:
//! - a one-token composite key `["a"]` reads back as the simple key `"a"`
//! - the empty composite key `[]` encodes to `""` and reads back as `""`

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Separator between the tokens of a composite key in a store identifier.
pub const COMPOSITE_SEPARATOR: &str = ",";

/// Key grammar violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key value is neither a string nor an array
    #[error("key must be a string or an array of strings")]
    WrongShape,

    /// A token does not match `[A-Za-z0-9_-]+`
    #[error("invalid key token '{0}'")]
    InvalidToken(String),

    /// A composite key element is not a string
    #[error("composite key element at index {0} is not a string")]
    NonStringElement(usize),
}

impl KeyError {
    /// Short reason code used in logs
    pub fn reason_code(&self) -> &'static str {
        match self {
            KeyError::WrongShape => "wrong_shape",
            KeyError::InvalidToken(_) => "invalid_token",
            KeyError::NonStringElement(_) => "non_string_element",
        }
    }
}

/// Abstract identifier of a dataset record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DatasetKey {
    /// A single token
    Simple(String),
    /// An ordered sequence of tokens
    Composite(Vec<String>),
}

impl DatasetKey {
    /// Parse and validate a key from an untrusted JSON value.
    ///
    /// # Examples
    ///
    /// ```
    /// use docgate_core::DatasetKey;
    /// use serde_json::json;
    ///
    /// assert!(DatasetKey::from_value(&json!("user_1")).is_ok());
    /// assert!(DatasetKey::from_value(&json!(["org", "user-1"])).is_ok());
    /// assert!(DatasetKey::from_value(&json!("bad key!")).is_err());
    /// assert!(DatasetKey::from_value(&json!(42)).is_err());
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, KeyError> {
        match value {
            Value::String(s) => {
                if !is_valid_token(s) {
                    return Err(KeyError::InvalidToken(s.clone()));
                }
                Ok(DatasetKey::Simple(s.clone()))
            }
            Value::Array(items) => {
                let mut tokens = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let token = item.as_str().ok_or(KeyError::NonStringElement(i))?;
                    if !is_valid_token(token) {
                        return Err(KeyError::InvalidToken(token.to_string()));
                    }
                    tokens.push(token.to_string());
                }
                Ok(DatasetKey::Composite(tokens))
            }
            _ => Err(KeyError::WrongShape),
        }
    }

    /// JSON form of the key, as returned to callers
    pub fn to_value(&self) -> Value {
        match self {
            DatasetKey::Simple(s) => Value::String(s.clone()),
            DatasetKey::Composite(tokens) => {
                Value::Array(tokens.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Store identifier for this key
    pub fn to_store_id(&self) -> String {
        to_store_id(self)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_store_id())
    }
}

/// Check a single token against `[A-Za-z0-9_-]+`.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// True iff `value` is a valid token or an array of valid tokens.
///
/// The empty array is accepted.
pub fn is_valid_key(value: &Value) -> bool {
    DatasetKey::from_value(value).is_ok()
}

/// Encode a key as the store's primary identifier.
pub fn to_store_id(key: &DatasetKey) -> String {
    match key {
        DatasetKey::Simple(s) => s.clone(),
        DatasetKey::Composite(tokens) => tokens.join(COMPOSITE_SEPARATOR),
    }
}

/// Decode a store identifier back into a key.
///
/// Splits on `,` only when the identifier contains one.
pub fn from_store_id(id: &str) -> DatasetKey {
    if id.contains(COMPOSITE_SEPARATOR) {
        DatasetKey::Composite(id.split(COMPOSITE_SEPARATOR).map(str::to_string).collect())
    } else {
        DatasetKey::Simple(id.to_string())
    }
}
