//! Error types for the payroll ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that can occur while handling wage records, accounts
//! and payroll documents.

use thiserror::Error;

/// The main error type for the payroll ledger.
///
/// All fallible operations return this error type, so the HTTP layer can map
/// every failure onto a response in one place.
///
/// # Example
///
/// ```
/// use payroll_ledger::error::PayrollError;
///
/// let error = PayrollError::RecordNotFound {
///     name: "alice".to_string(),
/// };
/// assert_eq!(error.to_string(), "Record not found: alice");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A required input field was not supplied.
    #[error("Missing field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// An input field was supplied but could not be accepted.
    #[error("Invalid field '{field}': {message}")]
    InvalidField {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No wage record exists under the requested name.
    #[error("Record not found: {name}")]
    RecordNotFound {
        /// The employee name that was looked up.
        name: String,
    },

    /// No account is registered for the given email.
    #[error("Account not found: {email}")]
    AccountNotFound {
        /// The email that was looked up.
        email: String,
    },

    /// An account is already registered for the given email.
    #[error("Account already exists: {email}")]
    AccountExists {
        /// The email that is already taken.
        email: String,
    },

    /// The password does not match the account's.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The request requires a signed-in session.
    #[error("Authentication required")]
    Unauthenticated,

    /// The record store failed to complete an operation.
    #[error("Record store failure: {message}")]
    StoreFailure {
        /// A description of the failure.
        message: String,
    },

    /// The identity provider failed to complete an operation.
    #[error("Identity provider failure: {message}")]
    IdentityFailure {
        /// A description of the failure.
        message: String,
    },
}

impl PayrollError {
    /// Builds an [`PayrollError::InvalidField`] for the given field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`PayrollError::MissingField`] for the given field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns true for failures caused by caller input rather than by a
    /// collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. }
        )
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
