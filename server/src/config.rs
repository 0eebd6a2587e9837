//! Environment configuration.
//!
//! Parsing runs over a lookup closure rather than the process environment
//! directly, so tests can feed it a map.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use todo_core::{PageLimits, StatusPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_SCYLLA_PORT: u16 = 9042;
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown TODO_STORE {0:?} (expected \"scylla\" or \"memory\")")]
    UnknownStore(String),

    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Scylla,
    Memory,
}

/// Connection settings for the cluster. Protocol version (v4) and
/// consistency (QUORUM) are fixed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScyllaConfig {
    pub host: String,
    pub port: u16,
    pub keyspace: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub connect_timeout: Duration,
}

impl ScyllaConfig {
    pub fn node(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreKind,
    pub scylla: ScyllaConfig,
    pub listen_addr: String,
    pub cors_origin: String,
    pub request_timeout: Duration,
    pub page_limits: PageLimits,
    pub statuses: StatusPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let store = match var("TODO_STORE").as_deref() {
            None | Some("scylla") => StoreKind::Scylla,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        // An unparsable port falls back to the default rather than failing.
        let port = var("SCYLLA_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SCYLLA_PORT);

        let scylla = ScyllaConfig {
            host: var("SCYLLA_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            // Unset means no keyspace is selected on connect.
            keyspace: var("SCYLLA_KEYSPACE").unwrap_or_default(),
            username: var("SCYLLA_USERNAME"),
            password: var("SCYLLA_PASSWORD"),
            connect_timeout: CONNECT_TIMEOUT,
        };

        let timeout_secs: u64 = parse_or("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 10)?;
        if timeout_secs == 0 || timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
            });
        }

        let default_size = parse_or(
            "TODO_DEFAULT_PAGE_SIZE",
            var("TODO_DEFAULT_PAGE_SIZE"),
            DEFAULT_PAGE_SIZE,
        )?;
        let max_size = parse_or("TODO_MAX_PAGE_SIZE", var("TODO_MAX_PAGE_SIZE"), MAX_PAGE_SIZE)?;
        if max_size <= 0 {
            return Err(ConfigError::Invalid {
                var: "TODO_MAX_PAGE_SIZE",
                value: max_size.to_string(),
            });
        }
        if default_size <= 0 || default_size > max_size {
            return Err(ConfigError::Invalid {
                var: "TODO_DEFAULT_PAGE_SIZE",
                value: default_size.to_string(),
            });
        }

        let statuses = var("TODO_ALLOWED_STATUSES")
            .map(|raw| StatusPolicy::from_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            store,
            scylla,
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            cors_origin: var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            page_limits: PageLimits {
                default_size,
                max_size,
            },
            statuses,
        })
    }
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables already set are not overridden, and a
/// missing file yields `Ok(None)`.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    optional_file(dotenvy::dotenv())
}

fn optional_file(loaded: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value: raw,
        }),
    }
}
