//! External calendar source contracts.
//!
//! The engine consumes holiday and Sabbath-time data through these traits.
//! Implementations wrap HTTP clients in the excluded integration layer;
//! tests substitute deterministic fakes. Failures are typed — the resolver
//! converts every [`SourceError`] into fallback behavior, so these errors
//! never reach the calculation core.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure while consulting an external calendar source.
///
/// Deliberately separate from [`crate::error::EngineError`]: source
/// failures are recoverable by design and never abort a calculation.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source did not answer within its timeout.
    #[error("calendar source timed out")]
    Timeout,

    /// The source was unreachable.
    #[error("calendar source network error: {message}")]
    Network {
        /// A description of the network failure.
        message: String,
    },

    /// The source answered with a response the wrapper could not parse.
    #[error("calendar source returned malformed data: {message}")]
    Malformed {
        /// A description of the parse failure.
        message: String,
    },
}

/// A type alias for Results from external calendar sources.
pub type SourceResult<T> = Result<T, SourceError>;

/// A holiday as reported by the holiday table or external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The holiday's name (e.g. "Yom Kippur").
    pub name: String,
    /// Whether worked hours on this date earn the holiday premium.
    pub is_paid: bool,
    /// Free-form category (e.g. "religious", "national").
    pub category: String,
}

/// A Sabbath window: the precise start and end instants around a Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SabbathWindow {
    /// Sabbath start (Friday evening).
    pub start: NaiveDateTime,
    /// Sabbath end (Saturday evening).
    pub end: NaiveDateTime,
    /// Whether the window is the fixed estimate rather than sunset-based.
    /// Rate-equivalent to a precise window; diagnostics only.
    pub is_estimated: bool,
}

impl SabbathWindow {
    /// Returns true if the instant falls inside the window (`start`
    /// inclusive, `end` exclusive).
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Returns true if the window overlaps the half-open range
    /// `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

/// Supplies the holidays of a calendar month.
pub trait HolidaySource: Send + Sync {
    /// Returns all holidays falling in the given month.
    fn holidays(&self, year: i32, month: u32) -> SourceResult<Vec<HolidayEntry>>;
}

/// Supplies precise Sabbath times for a given Saturday.
pub trait SabbathTimeSource: Send + Sync {
    /// Returns the Sabbath window around the given Saturday, or `None`
    /// when the source has no data for that date.
    fn shabbat_times(&self, saturday: NaiveDate) -> SourceResult<Option<SabbathWindow>>;
}
