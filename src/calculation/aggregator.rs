//! Monthly aggregation.
//!
//! [`PayrollCalculator`] is the engine's entry point: it resolves the
//! month's calendar context, normalizes attendance, classifies and pays
//! each day, and sums everything into the validated
//! [`PayrollResult`] contract. Each run is stateless given its
//! inputs — re-running with identical inputs yields a byte-identical
//! serialized result.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calendar::CalendarResolver;
use crate::config::PayRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApiIntegrations, CompensationProfile, CompensatoryDayCredit, CompensatoryDayLedger,
    CompensatoryReason, DailyDetail, PayrollResult, ResultMetadata, TierBreakdown, WorkInterval,
};

use super::classifier::classify_after;
use super::normalizer::normalize;
use super::strategy::CompensationStrategy;

/// Options controlling a calculation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationOptions {
    /// Skip the precise Sabbath-times source in favor of the fixed
    /// estimate. Used for bulk/background recalculation.
    pub fast_mode: bool,
    /// Invalidate the month's cached calendar context before resolving.
    pub force_recalculate: bool,
    /// Include the per-tier breakdown map in the result.
    pub include_breakdown: bool,
    /// Attach per-day details to the result metadata.
    pub include_daily_details: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            fast_mode: false,
            force_recalculate: false,
            include_breakdown: true,
            include_daily_details: false,
        }
    }
}

/// The payroll calculation engine for one rule set.
///
/// One calculator serves many concurrent employee-month runs; the only
/// shared state is the resolver's read-mostly month cache.
pub struct PayrollCalculator {
    rules: PayRules,
    resolver: CalendarResolver,
}

impl PayrollCalculator {
    /// Creates a calculator over the given rules and calendar resolver.
    pub fn new(rules: PayRules, resolver: CalendarResolver) -> Self {
        Self { rules, resolver }
    }

    /// Returns the rule set in force.
    pub fn rules(&self) -> &PayRules {
        &self.rules
    }

    /// Calculates the payroll result for one employee-month.
    ///
    /// Compensatory day credits earned during the month are granted
    /// through `ledger`; granting is idempotent per
    /// (employee, date, reason).
    ///
    /// # Errors
    ///
    /// Fails only for input contracts it cannot satisfy at all: an invalid
    /// period, a rejected profile, or malformed attendance. External
    /// calendar failures never fail the run — they degrade to fallback
    /// data and are reported in `metadata`.
    pub fn calculate(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        profile: &CompensationProfile,
        intervals: &[WorkInterval],
        ledger: &mut dyn CompensatoryDayLedger,
        options: CalculationOptions,
    ) -> EngineResult<PayrollResult> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidPeriod {
                message: format!("month {} is out of range 1-12", month),
            });
        }

        let strategy = CompensationStrategy::for_profile(profile, &self.rules)?;

        if options.force_recalculate {
            self.resolver.invalidate(year, month);
        }
        let context = self.resolver.month_context(year, month, options.fast_mode);
        let api_integrations = ApiIntegrations {
            holiday_source: context.holiday_status,
            sabbath_times_source: context.sabbath_status,
        };

        if intervals.is_empty() {
            debug!(employee_id, year, month, "no attendance; returning empty result");
            return Ok(PayrollResult::empty(
                strategy.name(),
                &profile.mode.to_string(),
                &profile.currency,
                api_integrations,
            ));
        }

        let (month_start, month_end) = month_span(year, month);
        for interval in intervals {
            if interval.start < month_start || interval.end > month_end {
                return Err(EngineError::InvalidPeriod {
                    message: format!(
                        "interval {} to {} lies outside {:04}-{:02}",
                        interval.start, interval.end, year, month
                    ),
                });
            }
        }

        let segments = normalize(intervals, &context, &self.rules)?;

        let mut total_salary = Decimal::ZERO;
        let mut total_hours = Decimal::ZERO;
        let mut regular_hours = Decimal::ZERO;
        let mut overtime_hours = Decimal::ZERO;
        let mut holiday_hours = Decimal::ZERO;
        let mut shabbat_hours = Decimal::ZERO;
        let mut breakdown: BTreeMap<String, TierBreakdown> = BTreeMap::new();
        let mut daily: BTreeMap<NaiveDate, DailyDetail> = BTreeMap::new();
        let mut warnings: Vec<String> = Vec::new();

        // Daily tier thresholds are cumulative: a date split at the Sabbath
        // boundary carries its running hours into the second segment.
        let mut worked_today: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for segment in &segments {
            let prior_hours = worked_today.get(&segment.date).copied().unwrap_or_default();
            let allocation = classify_after(segment, prior_hours, &self.rules.rates);
            worked_today.insert(segment.date, prior_hours + segment.total_hours);
            let day_pay = strategy.pay_day(segment.date, &allocation);

            total_salary += day_pay.total;
            total_hours += segment.total_hours;
            if segment.is_sabbath {
                shabbat_hours += segment.total_hours;
            } else if segment.is_holiday {
                holiday_hours += segment.total_hours;
            }

            for tier_pay in &day_pay.tier_pays {
                if tier_pay.hours.is_zero() {
                    continue;
                }
                if tier_pay.tier.is_regular() {
                    regular_hours += tier_pay.hours;
                } else {
                    overtime_hours += tier_pay.hours;
                }
                if options.include_breakdown {
                    let entry = breakdown
                        .entry(tier_pay.tier.name().to_string())
                        .or_default();
                    entry.hours += tier_pay.hours;
                    entry.pay += tier_pay.pay;
                }
            }

            if options.include_daily_details {
                let detail = daily.entry(segment.date).or_insert_with(|| DailyDetail {
                    date: segment.date,
                    hours: Decimal::ZERO,
                    pay: Decimal::ZERO,
                    tiers: BTreeMap::new(),
                });
                detail.hours += segment.total_hours;
                detail.pay += day_pay.total;
                for tier_pay in &day_pay.tier_pays {
                    if tier_pay.hours.is_zero() {
                        continue;
                    }
                    let tier_entry = detail
                        .tiers
                        .entry(tier_pay.tier.name().to_string())
                        .or_default();
                    tier_entry.hours += tier_pay.hours;
                    tier_entry.pay += tier_pay.pay;
                }
            }

            for warning in day_pay.warnings {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }

            if segment.is_premium() && segment.total_hours > Decimal::ZERO {
                // Sabbath reason wins on a combined Sabbath+holiday day,
                // matching the tier-table precedence.
                let reason = if segment.is_sabbath {
                    CompensatoryReason::Sabbath
                } else {
                    CompensatoryReason::Holiday
                };
                ledger.grant(CompensatoryDayCredit::new(employee_id, segment.date, reason));
            }
        }

        if context.holiday_status == crate::models::SourceStatus::Fallback {
            warnings.push("Holiday calendar unavailable; month treated as holiday-free".to_string());
        }
        if context.sabbath_status == crate::models::SourceStatus::Fallback {
            warnings.push("Sabbath times estimated for one or more dates".to_string());
        }

        info!(
            employee_id,
            year,
            month,
            strategy = strategy.name(),
            total_salary = %total_salary,
            total_hours = %total_hours,
            "payroll calculation completed"
        );

        Ok(PayrollResult {
            total_salary,
            total_hours,
            regular_hours,
            overtime_hours,
            holiday_hours,
            shabbat_hours,
            breakdown,
            metadata: ResultMetadata {
                calculation_strategy: strategy.name().to_string(),
                employee_type: profile.mode.to_string(),
                currency: profile.currency.clone(),
                warnings,
                api_integrations,
                daily_details: options
                    .include_daily_details
                    .then(|| daily.into_values().collect()),
            },
        })
    }
}

/// The half-open instant range `[first of month 00:00, first of next month
/// 00:00)`. An interval ending exactly at the upper bound is in range.
fn month_span(year: i32, month: u32) -> (NaiveDateTime, NaiveDateTime) {
    let start = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month start");
    (
        start.and_hms_opt(0, 0, 0).expect("valid midnight"),
        next.and_hms_opt(0, 0, 0).expect("valid midnight"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{
        HolidayEntry, HolidaySource, SabbathTimeSource, SabbathWindow, SourceResult,
    };
    use crate::models::{CompensationMode, InMemoryLedger};
    use chrono::NaiveDateTime;
    use std::str::FromStr;
    use std::sync::Arc;

    struct NoHolidays;

    impl HolidaySource for NoHolidays {
        fn holidays(&self, _year: i32, _month: u32) -> SourceResult<Vec<HolidayEntry>> {
            Ok(Vec::new())
        }
    }

    struct EstimateSabbath;

    impl SabbathTimeSource for EstimateSabbath {
        fn shabbat_times(&self, _saturday: NaiveDate) -> SourceResult<Option<SabbathWindow>> {
            Ok(None)
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn interval(start: &str, end: &str) -> WorkInterval {
        WorkInterval {
            start: dt(start),
            end: dt(end),
        }
    }

    fn calculator(local_holidays: Vec<HolidayEntry>) -> PayrollCalculator {
        let rules = PayRules::israeli_default();
        let resolver = CalendarResolver::new(
            local_holidays,
            Arc::new(NoHolidays),
            Arc::new(EstimateSabbath),
            rules.calendar,
        );
        PayrollCalculator::new(rules, resolver)
    }

    fn hourly_profile(rate: &str) -> CompensationProfile {
        CompensationProfile {
            mode: CompensationMode::Hourly,
            hourly_rate: Some(dec(rate)),
            monthly_base: None,
            currency: "ILS".to_string(),
        }
    }

    fn holiday(date_str: &str) -> HolidayEntry {
        HolidayEntry {
            date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
            name: "Holiday".to_string(),
            is_paid: true,
            category: "religious".to_string(),
        }
    }

    /// MA-001: empty attendance yields a valid all-zero result.
    #[test]
    fn test_ma_001_empty_month_is_zero_result() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.total_salary, Decimal::ZERO);
        assert_eq!(
            result.metadata.warnings,
            vec![PayrollResult::NO_DATA_WARNING.to_string()]
        );
    }

    /// MA-002: month totals sum across days and tiers.
    #[test]
    fn test_ma_002_month_totals() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[
                    // Monday 8h and Tuesday 10h.
                    interval("2025-03-10 09:00:00", "2025-03-10 17:00:00"),
                    interval("2025-03-11 09:00:00", "2025-03-11 19:00:00"),
                ],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.total_hours, dec("18.0"));
        assert_eq!(result.total_salary, dec("1835.00"));
        assert_eq!(result.regular_hours, dec("16.6"));
        assert_eq!(result.overtime_hours, dec("1.4"));
        assert_eq!(result.shabbat_hours, dec("0"));
        assert_eq!(result.breakdown["regular"].hours, dec("16.6"));
        assert_eq!(result.breakdown["overtime_1"].hours, dec("1.4"));
    }

    /// MA-003: Sabbath work earns one compensatory credit, idempotently.
    #[test]
    fn test_ma_003_sabbath_credit_idempotent() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let intervals = [interval("2025-03-15 09:00:00", "2025-03-15 17:00:00")];

        for _ in 0..2 {
            calc.calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &intervals,
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();
        }

        assert_eq!(ledger.credits().len(), 1);
        assert_eq!(ledger.credits()[0].reason, CompensatoryReason::Sabbath);
        assert_eq!(
            ledger.credits()[0].date_earned,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    /// MA-004: holiday work earns a holiday credit.
    #[test]
    fn test_ma_004_holiday_credit() {
        let calc = calculator(vec![holiday("2025-03-13")]);
        let mut ledger = InMemoryLedger::new();
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[interval("2025-03-13 09:00:00", "2025-03-13 17:00:00")],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.holiday_hours, dec("8.0"));
        assert_eq!(ledger.credits()[0].reason, CompensatoryReason::Holiday);
    }

    /// MA-005: identical inputs produce byte-identical serialized results.
    #[test]
    fn test_ma_005_idempotent_serialization() {
        let calc = calculator(vec![]);
        let intervals = [
            interval("2025-03-14 16:00:00", "2025-03-15 02:00:00"),
            interval("2025-03-17 09:00:00", "2025-03-17 20:00:00"),
        ];
        let run = || {
            let mut ledger = InMemoryLedger::new();
            let result = calc
                .calculate(
                    "emp_001",
                    2025,
                    3,
                    &hourly_profile("100"),
                    &intervals,
                    &mut ledger,
                    CalculationOptions {
                        include_daily_details: true,
                        ..CalculationOptions::default()
                    },
                )
                .unwrap();
            serde_json::to_string(&result).unwrap()
        };
        assert_eq!(run(), run());
    }

    /// MA-006: invalid month is rejected.
    #[test]
    fn test_ma_006_invalid_month_rejected() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let result = calc.calculate(
            "emp_001",
            2025,
            13,
            &hourly_profile("100"),
            &[],
            &mut ledger,
            CalculationOptions::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
    }

    /// MA-007: missing rate yields a zero month with one warning, not an
    /// error.
    #[test]
    fn test_ma_007_missing_rate_degrades() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let profile = CompensationProfile {
            mode: CompensationMode::Hourly,
            hourly_rate: None,
            monthly_base: None,
            currency: "ILS".to_string(),
        };
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &profile,
                &[
                    interval("2025-03-10 09:00:00", "2025-03-10 17:00:00"),
                    interval("2025-03-11 09:00:00", "2025-03-11 17:00:00"),
                ],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.total_salary, Decimal::ZERO);
        assert_eq!(result.total_hours, dec("16.0"));
        // Duplicate per-day warnings collapse to one.
        assert_eq!(result.metadata.warnings.len(), 1);
        // Hour accounting survives the degradation.
        assert_eq!(result.regular_hours + result.overtime_hours, dec("16.0"));
        assert_eq!(result.breakdown["regular"].hours, dec("16.0"));
        assert_eq!(result.breakdown["regular"].pay, Decimal::ZERO);
    }

    /// MA-008: daily details appear only when requested and merge the two
    /// sides of a Sabbath-boundary day.
    #[test]
    fn test_ma_008_daily_details() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let intervals = [interval("2025-03-14 16:00:00", "2025-03-14 22:00:00")];

        let without = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &intervals,
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();
        assert!(without.metadata.daily_details.is_none());

        let with = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &intervals,
                &mut ledger,
                CalculationOptions {
                    include_daily_details: true,
                    ..CalculationOptions::default()
                },
            )
            .unwrap();
        let details = with.metadata.daily_details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].hours, dec("6.0"));
    }

    /// MA-009: breakdown can be suppressed without changing the shape.
    #[test]
    fn test_ma_009_breakdown_suppressed() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[interval("2025-03-10 09:00:00", "2025-03-10 17:00:00")],
                &mut ledger,
                CalculationOptions {
                    include_breakdown: false,
                    ..CalculationOptions::default()
                },
            )
            .unwrap();
        assert!(result.breakdown.is_empty());
        assert_eq!(result.total_salary, dec("800.00"));
    }

    /// MA-010: fast mode completes with estimated windows and the same
    /// money as the estimate-based precise run.
    #[test]
    fn test_ma_010_fast_mode() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let intervals = [interval("2025-03-15 09:00:00", "2025-03-15 17:00:00")];

        let fast = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &intervals,
                &mut ledger,
                CalculationOptions {
                    fast_mode: true,
                    ..CalculationOptions::default()
                },
            )
            .unwrap();

        assert_eq!(fast.total_salary, dec("1200.00"));
        assert_eq!(
            fast.metadata.api_integrations.sabbath_times_source,
            crate::models::SourceStatus::NotConsulted
        );
    }

    /// MA-012: tier thresholds stay cumulative across a boundary-split
    /// date: a long Friday's Sabbath hours land in premium overtime, and
    /// the date's regular-tier hours never exceed the daily threshold.
    #[test]
    fn test_ma_012_thresholds_cumulative_across_boundary_split() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        // Friday 08:00-22:00 (14h); boundary at 19:30. Ordinary side 11.5h:
        // 8.6 @ 100% + 2.0 @ 125% + 0.9 @ 150%. Sabbath side 2.5h starts
        // past the day's OT1 band, so all of it pays 200%.
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[interval("2025-03-14 08:00:00", "2025-03-14 22:00:00")],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.regular_hours, dec("8.6"));
        assert_eq!(result.overtime_hours, dec("5.4"));
        assert_eq!(result.breakdown["regular"].hours, dec("8.6"));
        assert!(!result.breakdown.contains_key("sabbath_regular"));
        assert_eq!(result.breakdown["sabbath_overtime_2"].hours, dec("2.5"));
        // 860 + 250 + 135 + 500
        assert_eq!(result.total_salary, dec("1745.00"));
    }

    /// MA-013: intervals outside the requested month are rejected.
    #[test]
    fn test_ma_013_out_of_month_interval_rejected() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        let result = calc.calculate(
            "emp_001",
            2025,
            3,
            &hourly_profile("100"),
            &[
                interval("2025-03-10 09:00:00", "2025-03-10 17:00:00"),
                interval("2025-04-02 09:00:00", "2025-04-02 17:00:00"),
            ],
            &mut ledger,
            CalculationOptions::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));

        // An interval ending exactly at the month boundary is in range.
        let result = calc.calculate(
            "emp_001",
            2025,
            3,
            &hourly_profile("100"),
            &[interval("2025-03-31 20:00:00", "2025-04-01 00:00:00")],
            &mut ledger,
            CalculationOptions::default(),
        );
        assert!(result.is_ok());
    }

    /// MA-011: a Friday crossing the boundary splits hours between the
    /// ordinary and Sabbath sides.
    #[test]
    fn test_ma_011_friday_boundary_split_pay() {
        let calc = calculator(vec![]);
        let mut ledger = InMemoryLedger::new();
        // Friday 16:00-22:00; boundary at 19:30 → 3.5h ordinary + 2.5h Sabbath.
        let result = calc
            .calculate(
                "emp_001",
                2025,
                3,
                &hourly_profile("100"),
                &[interval("2025-03-14 16:00:00", "2025-03-14 22:00:00")],
                &mut ledger,
                CalculationOptions::default(),
            )
            .unwrap();

        assert_eq!(result.shabbat_hours, dec("2.5"));
        // 3.5h @ 100% + 2.5h @ 150%
        assert_eq!(result.total_salary, dec("725.00"));
        assert_eq!(ledger.credits().len(), 1);
    }
}
