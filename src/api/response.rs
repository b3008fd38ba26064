//! Response types for the payroll API.
//!
//! This module defines the JSON bodies returned on success and the error
//! response structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;
use crate::identity::{Account, AccountId};
use crate::models::WageRecord;
use crate::store::UpsertOutcome;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed form error response.
    pub fn malformed_form(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_FORM", message)
    }

    /// Creates a malformed query error response.
    pub fn malformed_query(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_QUERY", message)
    }

    /// Creates a missing field error response.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::with_details(
            "MISSING_FIELD",
            format!("missing field: {}", field),
            format!("Required field '{}' was not provided in the request", field),
        )
    }

    /// Creates a record not found error response.
    pub fn record_not_found(name: &str) -> Self {
        Self::with_details(
            "RECORD_NOT_FOUND",
            format!("Record not found: {}", name),
            format!("No wage record is stored under the name '{}'", name),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        match error {
            PayrollError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            PayrollError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            PayrollError::MissingField { field } => {
                ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::missing_field(field))
            }
            PayrollError::InvalidField { field, message } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid field '{}': {}", field, message),
                    "The submitted form contains invalid information",
                ),
            ),
            PayrollError::RecordNotFound { name } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::record_not_found(&name),
            ),
            PayrollError::AccountNotFound { email } => ApiErrorResponse::new(
                StatusCode::UNAUTHORIZED,
                ApiError::new(
                    "ACCOUNT_NOT_FOUND",
                    format!("No account is registered for {}", email),
                ),
            ),
            PayrollError::AccountExists { email } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new(
                    "ACCOUNT_EXISTS",
                    format!("An account is already registered for {}", email),
                ),
            ),
            PayrollError::InvalidCredentials => ApiErrorResponse::new(
                StatusCode::UNAUTHORIZED,
                ApiError::new("INVALID_CREDENTIALS", "Invalid email or password"),
            ),
            PayrollError::Unauthenticated => ApiErrorResponse::new(
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHENTICATED", "Sign in to access this resource"),
            ),
            PayrollError::StoreFailure { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORE_ERROR", "Record store operation failed", message),
            ),
            PayrollError::IdentityFailure { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("IDENTITY_ERROR", "Identity operation failed", message),
            ),
        }
    }
}

/// Body returned by `POST /register` and `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// The account id.
    pub account_id: AccountId,
    /// The account email.
    pub email: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            email: account.email,
        }
    }
}

/// Body returned by `GET /` and `POST /logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Whether the caller holds a signed-in session.
    pub authenticated: bool,
    /// The signed-in account, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
}

/// Body returned by `POST /add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSavedResponse {
    /// Whether the record was created or replaced an existing one.
    pub outcome: UpsertOutcome,
    /// The record as stored.
    pub record: WageRecord,
}

/// Body returned by `POST /remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRemovedResponse {
    /// The name that was targeted.
    pub name: String,
    /// Whether a record existed and was removed.
    pub removed: bool,
}

/// Body returned by `GET /list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    /// Number of records returned.
    pub count: usize,
    /// The matching records.
    pub employees: Vec<WageRecord>,
}

impl From<Vec<WageRecord>> for RecordListResponse {
    fn from(employees: Vec<WageRecord>) -> Self {
        Self {
            count: employees.len(),
            employees,
        }
    }
}
