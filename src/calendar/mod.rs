//! Calendar resolution for payroll calculation.
//!
//! Determines, per date, whether it is a Sabbath day or a paid holiday and
//! supplies precise Sabbath start/end instants. External sources are
//! consulted through narrow traits; every external failure degrades to
//! deterministic fallback data and is surfaced only as diagnostics.

mod cache;
mod resolver;
mod source;

pub use cache::MonthCache;
pub use resolver::{CalendarResolver, DayContext, MonthContext};
pub use source::{
    HolidayEntry, HolidaySource, SabbathTimeSource, SabbathWindow, SourceError, SourceResult,
};
