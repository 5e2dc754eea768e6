//! Configuration for the payroll calculation engine.
//!
//! Statutory thresholds and multipliers are configuration data, not
//! hardcoded logic. This module contains the strongly-typed rule structures,
//! a compiled-in Israeli baseline, and a YAML loader.

mod loader;
mod types;

pub use types::{
    CalendarRules, DailyThresholds, FeatureGates, NightWindow, PayRules, RateRules,
    SabbathEstimate, TierMultipliers,
};
