//! Configuration loading and management for the payroll service.
//!
//! This module loads the service configuration (listener address, record
//! store backend, session cookie and logging filter) from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use payroll_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Store backend: {:?}", config.config().store.backend);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    LoggingConfig, ServerConfig, ServiceConfig, SessionConfig, StoreBackend, StoreConfig,
};
