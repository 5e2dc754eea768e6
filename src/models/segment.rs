//! Day segment model.
//!
//! A [`DaySegment`] is the unit the rate classifier consumes: the total
//! worked hours for one calendar day on one side of the Sabbath boundary,
//! tagged with the calendar context the classifier needs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-day worked hours with calendar context.
///
/// Derived from one or more [`crate::models::WorkInterval`]s by the
/// attendance normalizer. An interval crossing midnight or a Sabbath
/// boundary produces separate segments with a precise split point, so every
/// segment is wholly ordinary or wholly Sabbath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySegment {
    /// The calendar date the hours fall on.
    pub date: NaiveDate,
    /// Total worked hours in this segment, exact decimal.
    pub total_hours: Decimal,
    /// Whether the hours fall inside a Sabbath window.
    pub is_sabbath: bool,
    /// Whether the date is a paid holiday.
    pub is_holiday: bool,
    /// Whether the hours fall predominantly within the night window.
    /// Affects only the regular-hours threshold, not multipliers.
    pub is_night: bool,
}

impl DaySegment {
    /// Returns true if any premium (Sabbath or holiday) table applies.
    pub fn is_premium(&self) -> bool {
        self.is_sabbath || self.is_holiday
    }
}
