//! Output enum for command execution results.
//!
//! Serialization is untagged so each variant is exactly the JSON body the
//! gateway returns.

use docgate_core::{DatasetKey, Record};
use serde::Serialize;

/// Successful command results.
///
/// | Command | Output | JSON |
/// |---------|--------|------|
/// | `Get` with filter | `Records` | array of records |
/// | `Get` with key | `MaybeRecord` | record or `null` |
/// | `Set` | `Key` | the written record's key |
/// | `Del` | `MaybeRecord` | removed record or `null` |
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// Records matching a filter
    Records(Vec<Record>),

    /// Zero or one record
    MaybeRecord(Option<Record>),

    /// Key of a written record
    Key(DatasetKey),
}
