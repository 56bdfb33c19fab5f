//! Gateway configuration via `docgate.toml`
//!
//! Every key is optional; missing keys take the defaults below. Command-line
//! flags override whatever the file says.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
/// Default store URL
pub const DEFAULT_STORE_URL: &str = "memory:";
/// Default collection for requests without `store`
pub const DEFAULT_COLLECTION: &str = "datasets";
/// Default request body cap (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default wait before the single connection retry
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 3000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Gateway configuration loaded from `docgate.toml`.
///
/// # Example
///
/// ```toml
/// listen = "127.0.0.1:8080"
/// store_url = "sqlite:/var/lib/docgate/data.db"
/// default_collection = "datasets"
/// max_body_bytes = 1048576
/// retry_backoff_ms = 3000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Socket address to listen on
    pub listen: String,
    /// Backing store, `memory:` or `sqlite:<path>`
    pub store_url: String,
    /// Collection used when a request has no `store`
    pub default_collection: String,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Wait before retrying a failed store connection
    pub retry_backoff_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            store_url: DEFAULT_STORE_URL.to_string(),
            default_collection: DEFAULT_COLLECTION.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl GatewayConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "listen",
                reason: "must not be empty".into(),
            });
        }
        if self.default_collection.is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_collection",
                reason: "must not be empty".into(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_body_bytes",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Retry backoff as a `Duration`
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docgate gateway configuration

# Address the HTTP listener binds to.
listen = "0.0.0.0:8080"

# Backing document store:
#   "memory:"              in-process, lost on exit
#   "sqlite:<path>"        SQLite database file
#   "sqlite::memory:"      private in-memory SQLite database
store_url = "memory:"

# Collection used when a request carries no "store" field.
default_collection = "datasets"

# Largest accepted request body in bytes; larger bodies get 413.
max_body_bytes = 1048576

# Wait before the single retry of a failed store connection.
retry_backoff_ms = 3000
"#
    }
}
