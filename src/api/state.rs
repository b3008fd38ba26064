//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::error::{PayrollError, PayrollResult};
use crate::identity::{IdentityProvider, InMemoryIdentityProvider};
use crate::session::SessionRegistry;
use crate::store::{InMemoryRecordStore, RecordStore};

/// Shared application state.
///
/// Holds the collaborators every handler talks to: the record store, the
/// identity provider and the live session registry.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Creates application state from its collaborators.
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            store,
            identity,
            sessions: Arc::new(sessions),
        }
    }

    /// State backed entirely by in-memory collaborators.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryIdentityProvider::new()),
            SessionRegistry::default(),
        )
    }

    /// Returns the record store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Returns the identity provider.
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Returns the session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Runs `op` against the record store on the blocking thread pool.
    ///
    /// Store backends may touch the filesystem, so handlers go through
    /// here rather than calling [`Self::store`] on a runtime worker.
    pub async fn with_store<T, F>(&self, op: F) -> PayrollResult<T>
    where
        F: FnOnce(&dyn RecordStore) -> PayrollResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| PayrollError::StoreFailure {
                message: format!("store task failed: {}", e),
            })?
    }

    /// Runs `op` against the identity provider on the blocking thread pool.
    ///
    /// Password hashing is CPU-bound and must stay off the runtime workers.
    pub async fn with_identity<T, F>(&self, op: F) -> PayrollResult<T>
    where
        F: FnOnce(&dyn IdentityProvider) -> PayrollResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let identity = Arc::clone(&self.identity);
        tokio::task::spawn_blocking(move || op(identity.as_ref()))
            .await
            .map_err(|e| PayrollError::IdentityFailure {
                message: format!("identity task failed: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_collaborators() {
        let state = AppState::in_memory();
        let clone = state.clone();

        let record =
            crate::models::WageRecord::parse("alice", "20", "40", "0", "north", "p1").unwrap();
        state.store().upsert(record).unwrap();

        assert_eq!(clone.store().list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_with_store_runs_against_shared_store() {
        let state = AppState::in_memory();
        let record =
            crate::models::WageRecord::parse("alice", "20", "40", "0", "north", "p1").unwrap();

        let outcome = state
            .with_store(move |store| store.upsert(record))
            .await
            .unwrap();
        assert_eq!(outcome, crate::store::UpsertOutcome::Inserted);

        let names = state
            .with_store(|store| Ok(store.list()?.into_iter().map(|r| r.name).collect::<Vec<_>>()))
            .await
            .unwrap();
        assert_eq!(names, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_with_store_propagates_errors() {
        let state = AppState::in_memory();
        let result: PayrollResult<()> = state
            .with_store(|_| {
                Err(PayrollError::StoreFailure {
                    message: "disk full".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(PayrollError::StoreFailure { .. })));
    }

    #[tokio::test]
    async fn test_with_store_reports_panicked_task() {
        let state = AppState::in_memory();
        let result: PayrollResult<()> = state.with_store(|_| panic!("backend crashed")).await;

        match result {
            Err(PayrollError::StoreFailure { message }) => {
                assert!(message.contains("store task failed"))
            }
            other => panic!("Expected StoreFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_with_identity_verifies_off_runtime() {
        let state = AppState::in_memory();
        state
            .identity()
            .create_account("clerk@example.com", "secret1")
            .unwrap();

        let verified = state
            .with_identity(|identity| identity.verify_credentials("clerk@example.com", "secret1"))
            .await;
        assert!(verified.is_ok());

        let refused = state
            .with_identity(|identity| identity.verify_credentials("clerk@example.com", "WRONG"))
            .await;
        assert!(matches!(refused, Err(PayrollError::InvalidCredentials)));
    }
}
