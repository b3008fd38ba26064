//! Calculation logic for the payroll ledger.
//!
//! This module contains the payroll calculator that turns a wage record into
//! gross, tax and net pay, the aggregator that totals a record set, and the
//! record filter that selects which records take part.

mod filter;
mod payroll;
mod report;

pub use filter::RecordFilter;
pub use payroll::{
    OVERTIME_MULTIPLIER, REGULAR_HOURS, TAX_RATE, calculate_payroll, overtime_hours,
};
pub use report::summarize_payroll;
