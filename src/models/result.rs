//! Payroll result models.
//!
//! [`PayrollResult`] is the engine's output contract. Its shape is the only
//! bit-exact boundary of the crate: field names and types must not drift,
//! since dependent reporting code binds to them directly. The result is
//! deterministic — it carries no wall-clock fields and uses ordered maps —
//! so re-running a calculation with identical inputs serializes to
//! byte-identical output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hours and pay accumulated in one tier across the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierBreakdown {
    /// Hours allocated to this tier.
    pub hours: Decimal,
    /// Pay earned in this tier.
    pub pay: Decimal,
}

/// Consultation status of an external data source during a calculation.
///
/// Diagnostics only: the monetary result is unaffected by whether a source
/// answered or the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// The source was consulted and answered.
    Ok,
    /// The source failed; fallback data was used.
    Fallback,
    /// The source was not consulted (local data sufficed, or fast mode).
    NotConsulted,
}

/// Per-source diagnostic statuses for a calculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiIntegrations {
    /// Status of the external holiday-calendar source.
    pub holiday_source: SourceStatus,
    /// Status of the external Sabbath-times source.
    pub sabbath_times_source: SourceStatus,
}

impl Default for ApiIntegrations {
    fn default() -> Self {
        Self {
            holiday_source: SourceStatus::NotConsulted,
            sabbath_times_source: SourceStatus::NotConsulted,
        }
    }
}

/// Per-day pay detail, attached to metadata when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDetail {
    /// The calendar date.
    pub date: NaiveDate,
    /// Total worked hours on the date.
    pub hours: Decimal,
    /// Total pay for the date.
    pub pay: Decimal,
    /// Per-tier hours and pay for the date.
    pub tiers: BTreeMap<String, TierBreakdown>,
}

/// Non-monetary metadata accompanying a payroll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// The compensation strategy that produced the result.
    pub calculation_strategy: String,
    /// The employee's compensation mode.
    pub employee_type: String,
    /// ISO currency code.
    pub currency: String,
    /// Human-readable warnings accumulated during calculation.
    pub warnings: Vec<String>,
    /// Per-source diagnostic statuses.
    pub api_integrations: ApiIntegrations,
    /// Per-day details, present only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_details: Option<Vec<DailyDetail>>,
}

/// The monthly payroll result contract.
///
/// All monetary and hour fields are exact decimals, never floating point,
/// to avoid rounding drift across tier summation. Constructed fresh per
/// (employee, year, month) request and never mutated after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Total pay for the month.
    pub total_salary: Decimal,
    /// Total worked hours for the month.
    pub total_hours: Decimal,
    /// Hours paid in regular (zero-premium) tiers.
    pub regular_hours: Decimal,
    /// Hours paid in any overtime tier (ordinary or premium).
    pub overtime_hours: Decimal,
    /// Hours worked on holiday days.
    pub holiday_hours: Decimal,
    /// Hours worked inside Sabbath windows.
    pub shabbat_hours: Decimal,
    /// Per-tier hours and pay, keyed by tier name.
    pub breakdown: BTreeMap<String, TierBreakdown>,
    /// Calculation metadata and diagnostics.
    pub metadata: ResultMetadata,
}

impl PayrollResult {
    /// Warning attached to an empty result.
    pub const NO_DATA_WARNING: &'static str = "No calculation data available";

    /// Constructs an all-zero, valid result for a period with no attendance.
    ///
    /// Downstream consumers never need null checks: a month with zero
    /// attendance is a valid zero result carrying a warning, not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{ApiIntegrations, PayrollResult};
    /// use rust_decimal::Decimal;
    ///
    /// let result = PayrollResult::empty("hourly", "hourly", "ILS", ApiIntegrations::default());
    /// assert_eq!(result.total_salary, Decimal::ZERO);
    /// assert_eq!(result.metadata.warnings, vec![PayrollResult::NO_DATA_WARNING]);
    /// ```
    pub fn empty(
        strategy: &str,
        employee_type: &str,
        currency: &str,
        api_integrations: ApiIntegrations,
    ) -> Self {
        Self {
            total_salary: Decimal::ZERO,
            total_hours: Decimal::ZERO,
            regular_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            holiday_hours: Decimal::ZERO,
            shabbat_hours: Decimal::ZERO,
            breakdown: BTreeMap::new(),
            metadata: ResultMetadata {
                calculation_strategy: strategy.to_string(),
                employee_type: employee_type.to_string(),
                currency: currency.to_string(),
                warnings: vec![Self::NO_DATA_WARNING.to_string()],
                api_integrations,
                daily_details: None,
            },
        }
    }
}
