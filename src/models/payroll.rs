//! Payroll output models.
//!
//! This module contains the [`PayrollBreakdown`] derived for a single wage
//! record and the [`PayrollReport`] aggregated across a filtered record set.
//! Neither is ever persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::RecordFilter;

/// Computed pay for one employee.
///
/// # Example
///
/// ```
/// use payroll_ledger::models::PayrollBreakdown;
/// use rust_decimal::Decimal;
///
/// let breakdown = PayrollBreakdown {
///     name: "alice".to_string(),
///     gross: Decimal::from(950),
///     taxes: Decimal::new(2375, 1),
///     deductions: Decimal::from(50),
///     net: Decimal::new(6625, 1),
/// };
/// assert_eq!(breakdown.gross - breakdown.taxes - breakdown.deductions, breakdown.net);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// The employee name, copied from the record.
    pub name: String,
    /// Pay before tax and deductions.
    pub gross: Decimal,
    /// Tax withheld from gross.
    pub taxes: Decimal,
    /// Fixed deductions, copied from the record.
    pub deductions: Decimal,
    /// Pay after tax and deductions.
    pub net: Decimal,
}

/// Breakdowns for a record sequence plus their running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// One breakdown per input record, in input order.
    pub employees: Vec<PayrollBreakdown>,
    /// Sum of every breakdown's gross.
    pub total_gross: Decimal,
    /// Sum of every breakdown's net.
    pub total_net: Decimal,
}

impl PayrollSummary {
    /// An empty summary with zero totals.
    pub fn empty() -> Self {
        Self {
            employees: Vec::new(),
            total_gross: Decimal::ZERO,
            total_net: Decimal::ZERO,
        }
    }
}

/// A payroll report as returned by the reporting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The version of the service that generated the report.
    pub ledger_version: String,
    /// The criteria the records were selected with.
    pub filter: RecordFilter,
    /// Per-employee breakdowns.
    pub employees: Vec<PayrollBreakdown>,
    /// Sum of gross pay across `employees`.
    pub total_gross: Decimal,
    /// Sum of net pay across `employees`.
    pub total_net: Decimal,
}

impl PayrollReport {
    /// Wraps a summary with a fresh identifier and timestamp.
    pub fn new(filter: RecordFilter, summary: PayrollSummary) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            ledger_version: env!("CARGO_PKG_VERSION").to_string(),
            filter,
            employees: summary.employees,
            total_gross: summary.total_gross,
            total_net: summary.total_net,
        }
    }
}
