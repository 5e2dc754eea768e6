//! Payroll Calculation Engine for Israeli labor law.
//!
//! This crate translates raw attendance intervals into an itemized monthly
//! pay breakdown with multi-tier overtime, Sabbath, and holiday premiums,
//! supporting both hourly and monthly-salaried compensation models.

#![warn(missing_docs)]

pub mod calculation;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;
