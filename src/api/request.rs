//! Request types for the payroll API.
//!
//! This module defines the form-encoded request bodies. Every field is
//! optional at the decoding stage so a missing field is reported as
//! `MISSING_FIELD` rather than as a generic decoding failure.

use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};
use crate::models::WageRecord;

/// Form body for `POST /add`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddRecordForm {
    /// The employee name.
    pub name: Option<String>,
    /// Hourly wage, as text.
    pub rate: Option<String>,
    /// Hours worked, as text.
    pub hours: Option<String>,
    /// Fixed deductions, as text.
    pub deductions: Option<String>,
    /// Branch tag.
    pub branch: Option<String>,
    /// Period token.
    pub date: Option<String>,
}

/// Form body for `POST /remove`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveRecordForm {
    /// The employee name to remove.
    pub name: Option<String>,
}

/// Form body for `POST /register` and `POST /login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsForm {
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

fn required(field: &str, value: Option<String>) -> PayrollResult<String> {
    value.ok_or_else(|| PayrollError::missing_field(field))
}

impl TryFrom<AddRecordForm> for WageRecord {
    type Error = PayrollError;

    fn try_from(form: AddRecordForm) -> PayrollResult<Self> {
        let name = required("name", form.name)?;
        let rate = required("rate", form.rate)?;
        let hours = required("hours", form.hours)?;
        let deductions = required("deductions", form.deductions)?;
        let branch = required("branch", form.branch)?;
        let date = required("date", form.date)?;

        WageRecord::parse(&name, &rate, &hours, &deductions, &branch, &date)
    }
}

impl RemoveRecordForm {
    /// Returns the name to remove.
    pub fn into_name(self) -> PayrollResult<String> {
        let name = required("name", self.name)?;
        if name.trim().is_empty() {
            return Err(PayrollError::invalid_field("name", "must not be empty"));
        }
        Ok(name)
    }
}

impl CredentialsForm {
    /// Returns the `(email, password)` pair.
    pub fn into_parts(self) -> PayrollResult<(String, String)> {
        Ok((
            required("email", self.email)?,
            required("password", self.password)?,
        ))
    }
}
