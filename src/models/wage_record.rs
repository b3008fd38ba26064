//! Wage record model and amount parsing.
//!
//! A [`WageRecord`] holds one employee's current pay inputs. Records are keyed
//! by employee name; there is no separate identifier.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// One employee's pay inputs for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageRecord {
    /// The employee name. Acts as the primary key.
    pub name: String,
    /// Hourly wage.
    pub rate: Decimal,
    /// Hours worked in the period.
    pub hours: Decimal,
    /// Fixed deduction amount.
    pub deductions: Decimal,
    /// Free-form organisational tag.
    pub branch: String,
    /// Opaque period token, only ever compared for equality.
    pub date: String,
}

impl WageRecord {
    /// Builds a record from raw text fields, as submitted by a form.
    ///
    /// The name must contain at least one non-whitespace character and the
    /// three amounts must parse as numbers. Nothing else is checked: negative
    /// amounts are accepted and flow into the payroll arithmetic unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::models::WageRecord;
    /// use rust_decimal::Decimal;
    ///
    /// let record = WageRecord::parse("alice", "20", "45", "50", "north", "2024-W01").unwrap();
    /// assert_eq!(record.rate, Decimal::from(20));
    ///
    /// assert!(WageRecord::parse("alice", "twenty", "45", "50", "north", "2024-W01").is_err());
    /// ```
    pub fn parse(
        name: &str,
        rate: &str,
        hours: &str,
        deductions: &str,
        branch: &str,
        date: &str,
    ) -> PayrollResult<Self> {
        if name.trim().is_empty() {
            return Err(PayrollError::invalid_field("name", "must not be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            rate: parse_amount("rate", rate)?,
            hours: parse_amount("hours", hours)?,
            deductions: parse_amount("deductions", deductions)?,
            branch: branch.to_string(),
            date: date.to_string(),
        })
    }
}

/// Parses a numeric form value into a [`Decimal`].
///
/// Surrounding whitespace is ignored. Plain decimal notation (`"12.50"`,
/// `"-3"`) and scientific notation (`"1.5e2"`) are accepted; anything else,
/// including `NaN` and infinities, is rejected as an invalid field. A
/// well-formed number that a [`Decimal`] cannot hold (`"1e30"`) is reported
/// as out of range rather than as not a number.
pub fn parse_amount(field: &str, raw: &str) -> PayrollResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PayrollError::invalid_field(field, "must be a number"));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            let message = match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => format!("'{}' is out of range", trimmed),
                _ => format!("'{}' is not a number", trimmed),
            };
            PayrollError::invalid_field(field, message)
        })
}
