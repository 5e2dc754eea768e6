//! Compensation profile model and profile-boundary validation.
//!
//! The profile identifies the calculation mode and rate for an employee.
//! Feature-gated modes (project-based compensation) are rejected here, at
//! the input-validation boundary, before reaching the calculation core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::FeatureGates;
use crate::error::{EngineError, EngineResult};

/// The compensation calculation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationMode {
    /// Paid per worked hour at tiered rates.
    Hourly,
    /// Fixed monthly salary; worked hours earn a time-proportional base
    /// plus bonus-only premium deltas.
    MonthlySalary,
    /// Project-based compensation. Feature-gated and disabled by default;
    /// rejected at profile validation, never handled by the calculator.
    ProjectBased,
}

impl std::fmt::Display for CompensationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompensationMode::Hourly => write!(f, "hourly"),
            CompensationMode::MonthlySalary => write!(f, "monthly_salary"),
            CompensationMode::ProjectBased => write!(f, "project_based"),
        }
    }
}

/// An employee's compensation model: mode, rate, and currency.
///
/// Exactly one of `hourly_rate`/`monthly_base` may be populated, matching
/// the mode; cross-populated profiles are rejected by
/// [`CompensationProfile::validate`]. A *missing* amount for the selected
/// mode is not a profile error — the strategy degrades to a zero-pay day
/// with a warning so a month always completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationProfile {
    /// The calculation mode.
    pub mode: CompensationMode,
    /// Hourly base rate; populated only for [`CompensationMode::Hourly`].
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Monthly base salary; populated only for
    /// [`CompensationMode::MonthlySalary`].
    #[serde(default)]
    pub monthly_base: Option<Decimal>,
    /// ISO currency code (e.g. "ILS").
    pub currency: String,
}

impl CompensationProfile {
    /// Validates the profile against the mode invariants and feature gates.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnsupportedCompensationMode`] for a feature-gated
    ///   mode that is disabled.
    /// - [`EngineError::InvalidProfile`] when an amount belonging to the
    ///   other mode is populated.
    pub fn validate(&self, gates: &FeatureGates) -> EngineResult<()> {
        match self.mode {
            CompensationMode::ProjectBased => {
                if !gates.project_based_enabled {
                    return Err(EngineError::UnsupportedCompensationMode {
                        mode: self.mode.to_string(),
                    });
                }
                Ok(())
            }
            CompensationMode::Hourly => {
                if self.monthly_base.is_some() {
                    return Err(EngineError::InvalidProfile {
                        field: "monthly_base".to_string(),
                        message: "must not be set for hourly mode".to_string(),
                    });
                }
                Ok(())
            }
            CompensationMode::MonthlySalary => {
                if self.hourly_rate.is_some() {
                    return Err(EngineError::InvalidProfile {
                        field: "hourly_rate".to_string(),
                        message: "must not be set for monthly salary mode".to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}
