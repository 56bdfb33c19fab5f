//! # docgate Executor
//!
//! Turns untrusted get/set/del payloads into document store operations.
//!
//! - [`validate`] - structural checks on a raw payload
//! - [`Command`] - a validated, typed operation
//! - [`Executor`] - runs commands against the connected store
//! - [`Output`] - the JSON-serializable result
//!
//! ## Quick Start
//!
//! ```text
//! use docgate_executor::Executor;
//!
//! let executor = Executor::new(connection, "datasets");
//! let output = executor.execute_payload(&json!({"set": {"key": "u1", "name": "Ann"}})).await?;
//! assert_eq!(serde_json::to_value(&output)?, json!("u1"));
//! ```
//!
//! ## Refusals
//!
//! Every [`Error`] means the same thing to the caller: the operation was
//! refused. The variants exist for logging; the gateway answers all of them
//! identically.

#![warn(missing_docs)]

mod command;
mod convert;
mod error;
mod executor;
mod output;
mod validate;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

pub use command::{Command, Target};
pub use error::Error;
pub use executor::Executor;
pub use output::Output;
pub use validate::{check, validate};

pub use docgate_core::{DatasetKey, Record};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
