//! Payroll aggregation across a record set.

use crate::models::{PayrollSummary, WageRecord};

use super::calculate_payroll;

/// Calculates every record and sums gross and net pay.
///
/// Breakdowns keep the order of `records`. An empty slice yields an empty
/// summary with zero totals.
///
/// # Examples
///
/// ```
/// use payroll_ledger::calculation::summarize_payroll;
/// use payroll_ledger::models::WageRecord;
/// use rust_decimal::Decimal;
///
/// let records = vec![
///     WageRecord::parse("alice", "20", "45", "50", "north", "p1").unwrap(),
///     WageRecord::parse("bob", "15", "30", "0", "north", "p1").unwrap(),
/// ];
///
/// let summary = summarize_payroll(&records);
/// assert_eq!(summary.total_gross, Decimal::from(1550));
/// ```
pub fn summarize_payroll(records: &[WageRecord]) -> PayrollSummary {
    records
        .iter()
        .map(calculate_payroll)
        .fold(PayrollSummary::empty(), |mut summary, breakdown| {
            summary.total_gross = summary.total_gross.saturating_add(breakdown.gross);
            summary.total_net = summary.total_net.saturating_add(breakdown.net);
            summary.employees.push(breakdown);
            summary
        })
}
