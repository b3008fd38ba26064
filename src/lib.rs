//! Payroll ledger for small multi-branch businesses.
//!
//! This crate stores per-employee wage records, computes gross pay with
//! overtime, taxes and net pay, aggregates payroll over filtered record sets
//! and renders single-employee payslips, all behind an authenticated HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod export;
pub mod identity;
pub mod models;
pub mod session;
pub mod store;
