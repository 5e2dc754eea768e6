//! Work interval model and attendance validation.
//!
//! A [`WorkInterval`] is a raw check-in/check-out pair as recorded by the
//! attendance store. Intervals are validated on entry: zero or negative
//! durations and timestamps carrying seconds are rejected, and overlapping
//! intervals for the same employee are flagged as a data-integrity violation
//! rather than silently merged.

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A raw check-in/check-out pair in local wall-clock time.
///
/// Invariants: `end > start`, and both instants are minute-aligned so
/// every duration is an exact decimal number of hours. Violating pairs are
/// rejected by [`WorkInterval::validate`], never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// The check-in instant.
    pub start: NaiveDateTime,
    /// The check-out instant.
    pub end: NaiveDateTime,
}

impl WorkInterval {
    /// Validates the interval invariants (`end > start`, minute-aligned
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInterval`] for zero-duration or
    /// negative-duration intervals, and for timestamps carrying seconds.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::WorkInterval;
    /// use chrono::NaiveDateTime;
    ///
    /// let interval = WorkInterval {
    ///     start: NaiveDateTime::parse_from_str("2025-03-10 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    ///     end: NaiveDateTime::parse_from_str("2025-03-10 17:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    /// };
    /// assert!(interval.validate().is_ok());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.end <= self.start {
            return Err(EngineError::InvalidInterval {
                message: format!(
                    "interval {} to {} has non-positive duration",
                    self.start, self.end
                ),
            });
        }
        if self.start.second() != 0 || self.end.second() != 0 {
            return Err(EngineError::InvalidInterval {
                message: format!(
                    "interval {} to {} is not minute-aligned",
                    self.start, self.end
                ),
            });
        }
        Ok(())
    }

    /// Returns the interval duration in hours as a decimal, exact for any
    /// minute-aligned interval.
    pub fn hours(&self) -> Decimal {
        let duration_seconds = (self.end - self.start).num_seconds();
        Decimal::new(duration_seconds, 0) / Decimal::new(3600, 0)
    }
}

/// Checks that a set of intervals is pairwise non-overlapping.
///
/// Intervals are compared after sorting by start; two intervals overlap when
/// the later one starts strictly before the earlier one ends. Touching
/// endpoints (one ends exactly when the next starts) are allowed.
///
/// # Errors
///
/// Returns [`EngineError::OverlappingIntervals`] naming the first
/// overlapping pair found.
pub fn check_non_overlapping(intervals: &[WorkInterval]) -> EngineResult<()> {
    let mut sorted: Vec<&WorkInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| i.start);

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.start < a.end {
            return Err(EngineError::OverlappingIntervals {
                date: b.start.date(),
                message: format!(
                    "{} to {} overlaps {} to {}",
                    a.start, a.end, b.start, b.end
                ),
            });
        }
    }
    Ok(())
}
