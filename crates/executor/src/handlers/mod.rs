//! Command handlers, one module per operation.
//!
//! | Module | Command | Store calls |
//! |--------|---------|-------------|
//! | `get` | `Get` | `find_one` or `find` |
//! | `set` | `Set` | `find_one`, `update` or `insert`, `find_one` |
//! | `del` | `Del` | `find_one`, `delete` |
//!
//! Multi-call sequences are not atomic. Two writers racing on the same key
//! can interleave between the read and the write; the store only guarantees
//! that each single call is atomic.

pub mod del;
pub mod get;
pub mod set;

use docgate_core::{from_store_document, Document, Record};

use crate::Result;

/// Convert a stored document back into a record
pub(crate) fn to_record(doc: &Document) -> Result<Record> {
    Ok(from_store_document(doc)?)
}
