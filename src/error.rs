//! Error types for the payroll calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll calculation.
//!
//! External calendar-source failures are deliberately *not* represented
//! here: they are modeled by [`crate::calendar::SourceError`] and never
//! propagate out of the calendar layer (they degrade to fallback data).

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the payroll calculation engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/rates.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/rates.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A work interval was invalid (zero or negative duration, or otherwise
    /// malformed). Invalid intervals are rejected, never silently dropped.
    #[error("Invalid work interval: {message}")]
    InvalidInterval {
        /// A description of what made the interval invalid.
        message: String,
    },

    /// Two work intervals for the same employee overlap in time.
    ///
    /// Overlapping attendance is a data-integrity violation flagged to the
    /// caller rather than silently merged.
    #[error("Overlapping work intervals on {date}: {message}")]
    OverlappingIntervals {
        /// The date on which the overlap occurs.
        date: NaiveDate,
        /// A description of the overlapping pair.
        message: String,
    },

    /// A compensation profile was invalid or internally inconsistent.
    #[error("Invalid compensation profile field '{field}': {message}")]
    InvalidProfile {
        /// The profile field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A compensation mode that is feature-gated (and currently disabled)
    /// was requested. Rejected before reaching the calculation core.
    #[error("Compensation mode '{mode}' is not enabled")]
    UnsupportedCompensationMode {
        /// The rejected compensation mode.
        mode: String,
    },

    /// The requested calculation period was invalid.
    #[error("Invalid calculation period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A result failed contract validation at the output boundary.
    ///
    /// This indicates a programming defect in a compensation strategy and
    /// must not be swallowed.
    #[error("Validation error: {message}")]
    ValidationError {
        /// A description of the contract violation.
        message: String,
    },
}

/// A type alias for Results that return [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
