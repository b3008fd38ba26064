//! Configuration types for the payroll service.
//!
//! This module contains the strongly-typed configuration structures that are
//! deserialized from the YAML configuration file. Every field has a default,
//! so an empty document is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::session::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE};

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Which record store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Records are kept in process memory only.
    Memory,
    /// Records are persisted to a JSON file.
    #[default]
    JsonFile,
}

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// The backend to open.
    pub backend: StoreBackend,
    /// Location of the JSON file for the `json_file` backend.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: PathBuf::from("./data/employees.json"),
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Seconds a session stays valid after login.
    pub max_age_secs: u64,
}

impl SessionConfig {
    /// The session lifetime as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_age_secs: DEFAULT_MAX_AGE.as_secs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// The complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Record store settings.
    pub store: StoreConfig,
    /// Session cookie settings.
    pub session: SessionConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}
