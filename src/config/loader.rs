//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{PayrollError, PayrollResult};

use super::types::ServiceConfig;

/// Loads and provides access to the service configuration.
///
/// # File Format
///
/// ```text
/// server:
///   bind_addr: "127.0.0.1:8080"
/// store:
///   backend: json_file        # or: memory
///   path: ./data/employees.json
/// session:
///   cookie_name: payroll_session
///   max_age_secs: 28800       # session lifetime
/// logging:
///   filter: info
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_ledger::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Listening on {}", loader.config().server.bind_addr);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: ServiceConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing or unreadable (`ConfigNotFound`)
    /// - The file is not valid YAML for [`ServiceConfig`] (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let config = Self::parse(&content).map_err(|message| PayrollError::ConfigParseError {
            path: path_str,
            message,
        })?;

        Ok(Self { config })
    }

    /// Parses configuration from YAML text.
    ///
    /// An empty document yields the default configuration.
    pub fn from_yaml(content: &str) -> PayrollResult<Self> {
        let config = Self::parse(content).map_err(|message| PayrollError::ConfigParseError {
            path: "<inline>".to_string(),
            message,
        })?;
        Ok(Self { config })
    }

    fn parse(content: &str) -> Result<ServiceConfig, String> {
        if content.trim().is_empty() {
            return Ok(ServiceConfig::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ServiceConfig {
        self.config
    }
}
