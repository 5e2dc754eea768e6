//! Calculation logic for the payroll engine.
//!
//! This module contains the attendance normalizer (interval splitting at
//! midnight and Sabbath boundaries), the rate classifier (greedy tier
//! partition of a day's hours), the two compensation strategies, and the
//! monthly aggregator that produces the final [`crate::models::PayrollResult`].

mod aggregator;
mod classifier;
mod normalizer;
mod strategy;

pub use aggregator::{CalculationOptions, PayrollCalculator};
pub use classifier::{Tier, TierAllocation, TierSlice, classify, classify_after};
pub use normalizer::normalize;
pub use strategy::{CompensationStrategy, DayPay, TierPay};
