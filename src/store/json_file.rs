//! Record store persisted to a JSON document on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{PayrollError, PayrollResult};
use crate::models::WageRecord;

use super::{RecordStore, UpsertOutcome};

/// A record store that keeps its records in a single JSON file.
///
/// The whole collection is held in memory and rewritten after every
/// mutation. The file is a JSON object mapping employee name to record. A
/// write goes to a temporary sibling first and is then renamed into place, so
/// a crash never leaves a half-written document behind. If the write fails
/// the in-memory collection is rolled back and the error is returned.
///
/// Mutations block on file I/O. Async callers should run them through
/// `tokio::task::spawn_blocking`, as the HTTP handlers do.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, WageRecord>>,
}

impl JsonFileRecordStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// A missing file opens as an empty store; the file is created on the
    /// first write.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_ledger::store::{JsonFileRecordStore, RecordStore};
    ///
    /// let store = JsonFileRecordStore::open("./data/employees.json")?;
    /// println!("{} records", store.list()?.len());
    /// # Ok::<(), payroll_ledger::error::PayrollError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| store_failure(&path, "create directory", e))?;
        }

        let records: BTreeMap<String, WageRecord> = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| store_failure(&path, "read", e))?;
            serde_json::from_str(&content).map_err(|e| store_failure(&path, "parse", e))?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), records = records.len(), "Opened JSON record store");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PayrollResult<RwLockReadGuard<'_, BTreeMap<String, WageRecord>>> {
        self.records.read().map_err(|_| poisoned())
    }

    fn write(&self) -> PayrollResult<RwLockWriteGuard<'_, BTreeMap<String, WageRecord>>> {
        self.records.write().map_err(|_| poisoned())
    }

    fn persist(&self, records: &BTreeMap<String, WageRecord>) -> PayrollResult<()> {
        let body = serde_json::to_vec_pretty(records)
            .map_err(|e| store_failure(&self.path, "serialize", e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, body).map_err(|e| store_failure(&tmp, "write", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| store_failure(&self.path, "replace", e))
    }
}

fn poisoned() -> PayrollError {
    PayrollError::StoreFailure {
        message: "record store lock poisoned".to_string(),
    }
}

fn store_failure(path: &Path, action: &str, error: impl std::fmt::Display) -> PayrollError {
    PayrollError::StoreFailure {
        message: format!("failed to {} '{}': {}", action, path.display(), error),
    }
}

impl RecordStore for JsonFileRecordStore {
    fn upsert(&self, record: WageRecord) -> PayrollResult<UpsertOutcome> {
        let mut records = self.write()?;
        let name = record.name.clone();
        let previous = records.insert(name.clone(), record);

        if let Err(err) = self.persist(&records) {
            match previous {
                Some(previous) => records.insert(name, previous),
                None => records.remove(&name),
            };
            return Err(err);
        }

        Ok(match previous {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        })
    }

    fn get(&self, name: &str) -> PayrollResult<Option<WageRecord>> {
        Ok(self.read()?.get(name).cloned())
    }

    fn delete(&self, name: &str) -> PayrollResult<bool> {
        let mut records = self.write()?;
        let Some(removed) = records.remove(name) else {
            return Ok(false);
        };

        if let Err(err) = self.persist(&records) {
            records.insert(name.to_string(), removed);
            return Err(err);
        }
        Ok(true)
    }

    fn list(&self) -> PayrollResult<Vec<WageRecord>> {
        Ok(self.read()?.values().cloned().collect())
    }
}
