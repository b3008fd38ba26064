//! Wage record storage.
//!
//! Records live in a keyed collection indexed by employee name. Writing a
//! record under a name that already exists replaces the stored record: the
//! store is an upsert map, and [`UpsertOutcome`] tells the caller which of the
//! two happened.
//!
//! # Example
//!
//! ```
//! use payroll_ledger::models::WageRecord;
//! use payroll_ledger::store::{InMemoryRecordStore, RecordStore, UpsertOutcome};
//!
//! let store = InMemoryRecordStore::new();
//! let first = WageRecord::parse("alice", "20", "40", "0", "north", "p1").unwrap();
//! let second = WageRecord::parse("alice", "22", "40", "0", "north", "p1").unwrap();
//!
//! assert_eq!(store.upsert(first).unwrap(), UpsertOutcome::Inserted);
//! assert_eq!(store.upsert(second.clone()).unwrap(), UpsertOutcome::Replaced);
//! assert_eq!(store.get("alice").unwrap(), Some(second));
//! ```

mod json_file;
mod memory;

pub use json_file::JsonFileRecordStore;
pub use memory::InMemoryRecordStore;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::PayrollResult;
use crate::models::WageRecord;

/// What an [`RecordStore::upsert`] did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// No record existed under the name; one was created.
    Inserted,
    /// A record existed under the name and was overwritten.
    Replaced,
}

/// A keyed collection of wage records.
///
/// Every operation is atomic on its own. There is no read-modify-write
/// transaction: two concurrent upserts under one name race and the last write
/// wins.
pub trait RecordStore: Send + Sync {
    /// Writes `record` under `record.name`, replacing any existing record.
    fn upsert(&self, record: WageRecord) -> PayrollResult<UpsertOutcome>;

    /// Fetches the record stored under `name`.
    fn get(&self, name: &str) -> PayrollResult<Option<WageRecord>>;

    /// Removes the record stored under `name`.
    ///
    /// Returns whether a record was removed; deleting an absent name is not
    /// an error.
    fn delete(&self, name: &str) -> PayrollResult<bool>;

    /// Returns every stored record.
    ///
    /// Callers must not rely on the order. Both shipped backends return
    /// records sorted by name.
    fn list(&self) -> PayrollResult<Vec<WageRecord>>;
}

/// Opens the backend selected by `config`.
pub fn open_store(config: &StoreConfig) -> PayrollResult<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::JsonFile => {
            info!(path = %config.path.display(), "Using JSON file record store");
            Ok(Arc::new(JsonFileRecordStore::open(&config.path)?))
        }
    }
}
