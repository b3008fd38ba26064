//! HTTP API module for the payroll service.
//!
//! This module provides the endpoints for signing in, maintaining wage
//! records, reporting on them and downloading payslips.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AddRecordForm, CredentialsForm, RemoveRecordForm};
pub use response::{
    AccountResponse, ApiError, RecordListResponse, RecordRemovedResponse, RecordSavedResponse,
    SessionResponse,
};
pub use state::AppState;
