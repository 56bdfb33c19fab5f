//! docgate HTTP gateway
//!
//! Accepts `GET /?get=u1` style query strings and `POST` JSON bodies, hands
//! the decoded payload to the [`Executor`](docgate_executor::Executor) and
//! writes the JSON result back with CORS headers.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | success | 200, JSON body |
//! | preflight (`OPTIONS`) | 204 |
//! | refused, unparseable body | 403, empty body |
//! | body over the size cap | 413 |
//! | other methods | 405 |
//! | broken request framing | 400 |

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod query;

pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use gateway::Gateway;
