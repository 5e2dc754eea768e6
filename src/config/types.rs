//! Configuration types for payroll rules.
//!
//! This module contains the strongly-typed rule structures that are
//! deserialized from YAML configuration files. The Israeli labor law
//! baseline is available via [`PayRules::israeli_default`].

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Multipliers for the three tiers of a daily rate table.
///
/// The same three-tier shape serves both the ordinary table
/// (100% / 125% / 150%) and the Sabbath/holiday premium table
/// (150% / 175% / 200%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierMultipliers {
    /// Multiplier for hours within the regular-hours threshold.
    pub regular: Decimal,
    /// Multiplier for the first overtime span (typically 2 hours).
    pub overtime_1: Decimal,
    /// Multiplier for all hours beyond the first overtime span.
    pub overtime_2: Decimal,
}

/// Daily cumulative-hour thresholds for tier allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DailyThresholds {
    /// Regular-hours threshold for an ordinary day shift (8.6 hours).
    pub day_regular_hours: Decimal,
    /// Regular-hours threshold for a night shift (7.0 hours).
    pub night_regular_hours: Decimal,
    /// Capacity of the first overtime tier beyond the threshold (2.0 hours).
    pub overtime_tier1_span: Decimal,
}

impl DailyThresholds {
    /// Returns the regular-hours threshold applicable to a segment.
    ///
    /// Night shifts use the lower nightly threshold; the multipliers are
    /// unaffected by the night flag.
    pub fn regular_hours(&self, is_night: bool) -> Decimal {
        if is_night {
            self.night_regular_hours
        } else {
            self.day_regular_hours
        }
    }
}

/// The nightly window used to tag night shifts (e.g. 22:00-06:00).
///
/// The window wraps midnight: `start` is on the evening of one day and
/// `end` is on the morning of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NightWindow {
    /// The evening start of the night window.
    pub start: NaiveTime,
    /// The morning end of the night window (next calendar day).
    pub end: NaiveTime,
}

/// Fixed fallback estimate for the Sabbath window, used when the external
/// astronomical source is unavailable or skipped (fast mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SabbathEstimate {
    /// Estimated Sabbath start time on Friday.
    pub friday_start: NaiveTime,
    /// Estimated Sabbath end time on Saturday.
    pub saturday_end: NaiveTime,
}

/// Rate rules: thresholds, tier multiplier tables, and the monthly norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateRules {
    /// Daily cumulative-hour thresholds.
    pub thresholds: DailyThresholds,
    /// Multipliers for ordinary days.
    pub ordinary: TierMultipliers,
    /// Multipliers for Sabbath and holiday days.
    pub premium: TierMultipliers,
    /// The legally defined average monthly hours used to derive the hourly
    /// equivalent of a monthly salary (182).
    pub monthly_norm_hours: Decimal,
}

/// Calendar-related rules: night window and the Sabbath fallback estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalendarRules {
    /// The night-shift tagging window.
    pub night_window: NightWindow,
    /// The deterministic Sabbath window estimate.
    pub sabbath_estimate: SabbathEstimate,
}

/// Feature gates for compensation modes that are disabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct FeatureGates {
    /// Whether project-based compensation profiles are accepted.
    #[serde(default)]
    pub project_based_enabled: bool,
}

/// The complete rule set consumed by the calculation engine.
///
/// Immutable for the duration of a calculation. Construct via
/// [`PayRules::israeli_default`] or load from YAML with [`PayRules::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PayRules {
    /// Rate thresholds and multipliers.
    pub rates: RateRules,
    /// Calendar rules.
    pub calendar: CalendarRules,
    /// Feature gates.
    #[serde(default)]
    pub features: FeatureGates,
}

impl PayRules {
    /// Returns the Israeli labor law baseline rule set.
    ///
    /// - Regular-hours threshold: 8.6 hours (day), 7.0 hours (night shift).
    /// - Ordinary overtime: next 2.0 hours at 125%, beyond at 150%.
    /// - Sabbath/holiday: 150% regular, next 2.0 hours at 175%, beyond at 200%.
    /// - Monthly norm: 182 hours.
    /// - Night window 22:00-06:00; Sabbath estimate Friday 19:30 to
    ///   Saturday 20:30.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::PayRules;
    /// use rust_decimal::Decimal;
    ///
    /// let rules = PayRules::israeli_default();
    /// assert_eq!(rules.rates.thresholds.day_regular_hours, Decimal::new(86, 1));
    /// assert_eq!(rules.rates.premium.overtime_2, Decimal::new(200, 2));
    /// ```
    pub fn israeli_default() -> Self {
        Self {
            rates: RateRules {
                thresholds: DailyThresholds {
                    day_regular_hours: Decimal::new(86, 1),
                    night_regular_hours: Decimal::new(70, 1),
                    overtime_tier1_span: Decimal::new(20, 1),
                },
                ordinary: TierMultipliers {
                    regular: Decimal::new(100, 2),
                    overtime_1: Decimal::new(125, 2),
                    overtime_2: Decimal::new(150, 2),
                },
                premium: TierMultipliers {
                    regular: Decimal::new(150, 2),
                    overtime_1: Decimal::new(175, 2),
                    overtime_2: Decimal::new(200, 2),
                },
                monthly_norm_hours: Decimal::new(182, 0),
            },
            calendar: CalendarRules {
                night_window: NightWindow {
                    start: NaiveTime::from_hms_opt(22, 0, 0).expect("valid time"),
                    end: NaiveTime::from_hms_opt(6, 0, 0).expect("valid time"),
                },
                sabbath_estimate: SabbathEstimate {
                    friday_start: NaiveTime::from_hms_opt(19, 30, 0).expect("valid time"),
                    saturday_end: NaiveTime::from_hms_opt(20, 30, 0).expect("valid time"),
                },
            },
            features: FeatureGates {
                project_based_enabled: false,
            },
        }
    }
}
