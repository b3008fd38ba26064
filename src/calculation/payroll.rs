//! Payroll calculation.
//!
//! This module turns a [`WageRecord`] into a [`PayrollBreakdown`] using fixed
//! rules: a 40 hour regular week, overtime at time and a half, and a flat 25%
//! tax on gross.

use rust_decimal::Decimal;

use crate::models::{PayrollBreakdown, WageRecord};

/// Hours paid at the regular rate each period.
pub const REGULAR_HOURS: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Multiplier applied to the rate for every hour beyond [`REGULAR_HOURS`].
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Flat tax rate applied to gross pay.
pub const TAX_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Returns the hours worked beyond [`REGULAR_HOURS`], never negative.
///
/// # Examples
///
/// ```
/// use payroll_ledger::calculation::overtime_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(overtime_hours(Decimal::from(45)), Decimal::from(5));
/// assert_eq!(overtime_hours(Decimal::from(30)), Decimal::ZERO);
/// ```
pub fn overtime_hours(hours: Decimal) -> Decimal {
    hours.saturating_sub(REGULAR_HOURS).max(Decimal::ZERO)
}

/// Calculates gross, tax and net pay for a wage record.
///
/// Regular pay is always `40 * rate`, whatever the hours worked: a record
/// with fewer than 40 hours is still paid for 40. Hours beyond 40 are paid at
/// `rate * 1.5`. Taxes are 25% of gross and net is gross less taxes and the
/// record's deductions.
///
/// The function is total. No input is rejected; negative amounts propagate
/// algebraically, and arithmetic saturates at the bounds of [`Decimal`].
///
/// # Examples
///
/// ```
/// use payroll_ledger::calculation::calculate_payroll;
/// use payroll_ledger::models::WageRecord;
/// use rust_decimal::Decimal;
///
/// let record = WageRecord::parse("alice", "20", "45", "50", "north", "p1").unwrap();
/// let breakdown = calculate_payroll(&record);
///
/// assert_eq!(breakdown.gross, Decimal::from(950));
/// assert_eq!(breakdown.taxes, Decimal::new(2375, 1));
/// assert_eq!(breakdown.net, Decimal::new(6625, 1));
/// ```
pub fn calculate_payroll(record: &WageRecord) -> PayrollBreakdown {
    let regular_pay = REGULAR_HOURS.saturating_mul(record.rate);
    let overtime_pay = overtime_hours(record.hours)
        .saturating_mul(record.rate)
        .saturating_mul(OVERTIME_MULTIPLIER);

    let gross = regular_pay.saturating_add(overtime_pay);
    let taxes = gross.saturating_mul(TAX_RATE);
    let net = gross.saturating_sub(taxes).saturating_sub(record.deductions);

    PayrollBreakdown {
        name: record.name.clone(),
        gross,
        taxes,
        deductions: record.deductions,
        net,
    }
}
