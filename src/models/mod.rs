//! Core data models for the payroll ledger.
//!
//! This module contains the wage record kept in the store and the payroll
//! figures derived from it.

mod payroll;
mod wage_record;

pub use payroll::{PayrollBreakdown, PayrollReport, PayrollSummary};
pub use wage_record::{WageRecord, parse_amount};
