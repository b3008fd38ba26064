//! In-process record store.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{PayrollError, PayrollResult};
use crate::models::WageRecord;

use super::{RecordStore, UpsertOutcome};

/// A record store held entirely in memory.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<String, WageRecord>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `records`. Later duplicates replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = WageRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    fn read(&self) -> PayrollResult<RwLockReadGuard<'_, BTreeMap<String, WageRecord>>> {
        self.records.read().map_err(|_| poisoned())
    }

    fn write(&self) -> PayrollResult<RwLockWriteGuard<'_, BTreeMap<String, WageRecord>>> {
        self.records.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> PayrollError {
    PayrollError::StoreFailure {
        message: "record store lock poisoned".to_string(),
    }
}

impl RecordStore for InMemoryRecordStore {
    fn upsert(&self, record: WageRecord) -> PayrollResult<UpsertOutcome> {
        let previous = self.write()?.insert(record.name.clone(), record);
        Ok(match previous {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        })
    }

    fn get(&self, name: &str) -> PayrollResult<Option<WageRecord>> {
        Ok(self.read()?.get(name).cloned())
    }

    fn delete(&self, name: &str) -> PayrollResult<bool> {
        Ok(self.write()?.remove(name).is_some())
    }

    fn list(&self) -> PayrollResult<Vec<WageRecord>> {
        Ok(self.read()?.values().cloned().collect())
    }
}
