//! Core data models for the payroll calculation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod comp_day;
mod interval;
mod profile;
mod result;
mod segment;

pub use comp_day::{
    CompensatoryDayCredit, CompensatoryDayLedger, CompensatoryReason, InMemoryLedger,
};
pub use interval::{WorkInterval, check_non_overlapping};
pub use profile::{CompensationMode, CompensationProfile};
pub use result::{
    ApiIntegrations, DailyDetail, PayrollResult, ResultMetadata, SourceStatus, TierBreakdown,
};
pub use segment::DaySegment;
