//! Calendar resolution with graceful degradation.
//!
//! The resolver assembles a [`MonthContext`] — holiday table plus Sabbath
//! windows — once per month and caches it. The locally persisted holiday
//! table is the source of truth; the external holiday source is consulted
//! only for months the local table does not cover. Sabbath windows prefer
//! exact sunset-based times from the external source and fall back to the
//! fixed estimate on any failure. Resolution never raises to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use tracing::{debug, warn};

use crate::config::CalendarRules;
use crate::models::SourceStatus;

use super::cache::MonthCache;
use super::source::{HolidayEntry, HolidaySource, SabbathTimeSource, SabbathWindow};

/// Resolved calendar context for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayContext {
    /// Whether the date is a Sabbath day (Saturday).
    pub is_sabbath: bool,
    /// Whether the date is a paid holiday.
    pub is_holiday: bool,
    /// The Sabbath window touching the date, if any.
    pub sabbath_window: Option<SabbathWindow>,
}

/// Resolved calendar data for a whole month, shared across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthContext {
    /// Paid-holiday entries by date.
    pub holidays: BTreeMap<NaiveDate, HolidayEntry>,
    /// Sabbath windows for every Saturday touching the month, ordered.
    pub sabbath_windows: Vec<SabbathWindow>,
    /// Diagnostic status of the external holiday source.
    pub holiday_status: SourceStatus,
    /// Diagnostic status of the external Sabbath-times source.
    pub sabbath_status: SourceStatus,
}

impl MonthContext {
    /// Returns true if the date is a paid holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.get(&date).is_some_and(|h| h.is_paid)
    }

    /// Returns the Sabbath window overlapping the half-open instant range,
    /// if any.
    pub fn window_overlapping(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&SabbathWindow> {
        self.sabbath_windows.iter().find(|w| w.overlaps(start, end))
    }

    /// Returns true if any window in the month is estimated.
    pub fn has_estimated_windows(&self) -> bool {
        self.sabbath_windows.iter().any(|w| w.is_estimated)
    }
}

/// Resolves Sabbath/holiday context per date with monthly caching.
///
/// External failures degrade: missing holiday data resolves to "not
/// holiday", missing Sabbath times resolve to the fixed estimate. Both are
/// logged and recorded in the context's diagnostic statuses.
pub struct CalendarResolver {
    local_holidays: BTreeMap<NaiveDate, HolidayEntry>,
    holiday_source: Arc<dyn HolidaySource>,
    sabbath_source: Arc<dyn SabbathTimeSource>,
    rules: CalendarRules,
    cache: MonthCache<MonthContext>,
}

impl CalendarResolver {
    /// Creates a resolver over the given local holiday table and sources.
    pub fn new(
        local_holidays: Vec<HolidayEntry>,
        holiday_source: Arc<dyn HolidaySource>,
        sabbath_source: Arc<dyn SabbathTimeSource>,
        rules: CalendarRules,
    ) -> Self {
        Self {
            local_holidays: local_holidays.into_iter().map(|h| (h.date, h)).collect(),
            holiday_source,
            sabbath_source,
            rules,
            cache: MonthCache::new(),
        }
    }

    /// Replaces the cache with one using a custom TTL. Intended for tests.
    pub fn with_cache(mut self, cache: MonthCache<MonthContext>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the resolved context for a month, populating the cache at
    /// most once per (month, mode) within the TTL.
    ///
    /// In fast mode the Sabbath-times source is skipped entirely and the
    /// fixed estimate is used, trading precision for call volume.
    pub fn month_context(&self, year: i32, month: u32, fast_mode: bool) -> Arc<MonthContext> {
        self.cache.get_or_populate(year, month, fast_mode, || {
            self.build_month_context(year, month, fast_mode)
        })
    }

    /// Drops cached context for a month, forcing the next call to
    /// repopulate. Used on forced recalculation and holiday-data changes.
    pub fn invalidate(&self, year: i32, month: u32) {
        self.cache.invalidate(year, month);
    }

    /// Resolves the calendar context for a single date (precise mode).
    ///
    /// Never returns an error; external failures have already degraded to
    /// fallback data inside the month context.
    pub fn resolve(&self, date: NaiveDate) -> DayContext {
        let context = self.month_context(date.year(), date.month(), false);
        let day_start = date.and_hms_opt(0, 0, 0).expect("valid midnight");
        let day_end = day_start + chrono::Duration::days(1);

        DayContext {
            is_sabbath: date.weekday() == Weekday::Sat,
            is_holiday: context.is_holiday(date),
            sabbath_window: context.window_overlapping(day_start, day_end).copied(),
        }
    }

    fn build_month_context(&self, year: i32, month: u32, fast_mode: bool) -> MonthContext {
        let (holidays, holiday_status) = self.resolve_holidays(year, month);
        let (sabbath_windows, sabbath_status) = self.resolve_windows(year, month, fast_mode);

        debug!(
            year,
            month,
            holidays = holidays.len(),
            windows = sabbath_windows.len(),
            "month context resolved"
        );

        MonthContext {
            holidays,
            sabbath_windows,
            holiday_status,
            sabbath_status,
        }
    }

    /// Local table entries win; the external source is consulted only when
    /// the table has no entry at all for the month.
    fn resolve_holidays(
        &self,
        year: i32,
        month: u32,
    ) -> (BTreeMap<NaiveDate, HolidayEntry>, SourceStatus) {
        let local: BTreeMap<NaiveDate, HolidayEntry> = self
            .local_holidays
            .range(month_range(year, month))
            .map(|(d, h)| (*d, h.clone()))
            .collect();

        if !local.is_empty() {
            return (local, SourceStatus::NotConsulted);
        }

        match self.holiday_source.holidays(year, month) {
            Ok(entries) => {
                let map = entries
                    .into_iter()
                    .filter(|h| h.date.year() == year && h.date.month() == month)
                    .map(|h| (h.date, h))
                    .collect();
                (map, SourceStatus::Ok)
            }
            Err(e) => {
                warn!(year, month, error = %e, "holiday source failed; treating month as holiday-free");
                (BTreeMap::new(), SourceStatus::Fallback)
            }
        }
    }

    fn resolve_windows(
        &self,
        year: i32,
        month: u32,
        fast_mode: bool,
    ) -> (Vec<SabbathWindow>, SourceStatus) {
        let mut windows = Vec::new();
        let mut any_failed = false;

        for saturday in saturdays_touching(year, month) {
            if fast_mode {
                windows.push(self.estimated_window(saturday));
                continue;
            }
            match self.sabbath_source.shabbat_times(saturday) {
                Ok(Some(window)) => windows.push(window),
                Ok(None) => {
                    debug!(%saturday, "no Sabbath times for date; using estimate");
                    windows.push(self.estimated_window(saturday));
                }
                Err(e) => {
                    warn!(%saturday, error = %e, "Sabbath source failed; using estimate");
                    any_failed = true;
                    windows.push(self.estimated_window(saturday));
                }
            }
        }

        let status = if fast_mode {
            SourceStatus::NotConsulted
        } else if any_failed {
            SourceStatus::Fallback
        } else {
            SourceStatus::Ok
        };
        (windows, status)
    }

    /// The fixed estimate window anchored at a Saturday.
    fn estimated_window(&self, saturday: NaiveDate) -> SabbathWindow {
        let friday = saturday - Days::new(1);
        SabbathWindow {
            start: friday.and_time(self.rules.sabbath_estimate.friday_start),
            end: saturday.and_time(self.rules.sabbath_estimate.saturday_end),
            is_estimated: true,
        }
    }
}

/// The date range `[first of month, first of next month)`.
fn month_range(year: i32, month: u32) -> std::ops::Range<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month start");
    first..next
}

/// All Saturdays whose Sabbath window can touch the month: those within
/// the month plus the one right after its last day (covering a final
/// Friday evening).
fn saturdays_touching(year: i32, month: u32) -> Vec<NaiveDate> {
    let range = month_range(year, month);
    let mut date = range.start;
    // Extend one day past the month so a trailing Friday's window exists.
    let end = range.end + Days::new(1);

    let mut saturdays = Vec::new();
    while date < end {
        if date.weekday() == Weekday::Sat {
            saturdays.push(date);
        }
        date = date + Days::new(1);
    }
    saturdays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::source::{SourceError, SourceResult};
    use crate::config::PayRules;

    struct FakeHolidaySource(Vec<HolidayEntry>);

    impl HolidaySource for FakeHolidaySource {
        fn holidays(&self, _year: i32, _month: u32) -> SourceResult<Vec<HolidayEntry>> {
            Ok(self.0.clone())
        }
    }

    struct FailingHolidaySource;

    impl HolidaySource for FailingHolidaySource {
        fn holidays(&self, _year: i32, _month: u32) -> SourceResult<Vec<HolidayEntry>> {
            Err(SourceError::Timeout)
        }
    }

    struct PreciseSabbathSource;

    impl SabbathTimeSource for PreciseSabbathSource {
        fn shabbat_times(&self, saturday: NaiveDate) -> SourceResult<Option<SabbathWindow>> {
            let friday = saturday - Days::new(1);
            Ok(Some(SabbathWindow {
                start: friday.and_hms_opt(19, 12, 0).unwrap(),
                end: saturday.and_hms_opt(20, 14, 0).unwrap(),
                is_estimated: false,
            }))
        }
    }

    struct FailingSabbathSource;

    impl SabbathTimeSource for FailingSabbathSource {
        fn shabbat_times(&self, _saturday: NaiveDate) -> SourceResult<Option<SabbathWindow>> {
            Err(SourceError::Network {
                message: "connection refused".to_string(),
            })
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn holiday(date_str: &str, name: &str, is_paid: bool) -> HolidayEntry {
        HolidayEntry {
            date: date(date_str),
            name: name.to_string(),
            is_paid,
            category: "religious".to_string(),
        }
    }

    fn resolver(
        local: Vec<HolidayEntry>,
        holiday_source: Arc<dyn HolidaySource>,
        sabbath_source: Arc<dyn SabbathTimeSource>,
    ) -> CalendarResolver {
        CalendarResolver::new(
            local,
            holiday_source,
            sabbath_source,
            PayRules::israeli_default().calendar,
        )
    }

    /// CR-001: Saturday resolves as Sabbath with a precise window.
    #[test]
    fn test_cr_001_saturday_is_sabbath_with_precise_window() {
        let r = resolver(
            vec![],
            Arc::new(FakeHolidaySource(vec![])),
            Arc::new(PreciseSabbathSource),
        );
        // 2025-03-15 is a Saturday
        let ctx = r.resolve(date("2025-03-15"));
        assert!(ctx.is_sabbath);
        assert!(!ctx.is_holiday);
        let window = ctx.sabbath_window.unwrap();
        assert!(!window.is_estimated);
        assert_eq!(window.end, date("2025-03-15").and_hms_opt(20, 14, 0).unwrap());
    }

    /// CR-002: local holiday table wins; external source not consulted.
    #[test]
    fn test_cr_002_local_table_precedence() {
        let r = resolver(
            vec![holiday("2025-04-13", "Passover", true)],
            // External source disagrees; must not be consulted.
            Arc::new(FakeHolidaySource(vec![holiday(
                "2025-04-14",
                "Passover (API)",
                true,
            )])),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.month_context(2025, 4, false);
        assert!(ctx.is_holiday(date("2025-04-13")));
        assert!(!ctx.is_holiday(date("2025-04-14")));
        assert_eq!(ctx.holiday_status, SourceStatus::NotConsulted);
    }

    /// CR-003: empty local table falls through to the external source.
    #[test]
    fn test_cr_003_external_source_when_local_empty() {
        let r = resolver(
            vec![],
            Arc::new(FakeHolidaySource(vec![holiday(
                "2025-06-02",
                "Shavuot",
                true,
            )])),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.month_context(2025, 6, false);
        assert!(ctx.is_holiday(date("2025-06-02")));
        assert_eq!(ctx.holiday_status, SourceStatus::Ok);
    }

    /// CR-004: holiday source failure degrades to "not holiday".
    #[test]
    fn test_cr_004_holiday_failure_degrades() {
        let r = resolver(
            vec![],
            Arc::new(FailingHolidaySource),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.month_context(2025, 6, false);
        assert!(ctx.holidays.is_empty());
        assert_eq!(ctx.holiday_status, SourceStatus::Fallback);
    }

    /// CR-005: Sabbath source failure falls back to the fixed estimate.
    #[test]
    fn test_cr_005_sabbath_failure_uses_estimate() {
        let r = resolver(
            vec![],
            Arc::new(FakeHolidaySource(vec![])),
            Arc::new(FailingSabbathSource),
        );
        let ctx = r.resolve(date("2025-03-15"));
        let window = ctx.sabbath_window.unwrap();
        assert!(window.is_estimated);
        assert_eq!(
            window.start,
            date("2025-03-14").and_hms_opt(19, 30, 0).unwrap()
        );
        assert_eq!(
            window.end,
            date("2025-03-15").and_hms_opt(20, 30, 0).unwrap()
        );
        let month = r.month_context(2025, 3, false);
        assert_eq!(month.sabbath_status, SourceStatus::Fallback);
    }

    /// CR-006: fast mode skips the Sabbath source entirely.
    #[test]
    fn test_cr_006_fast_mode_skips_source() {
        let r = resolver(
            vec![],
            Arc::new(FakeHolidaySource(vec![])),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.month_context(2025, 3, true);
        assert_eq!(ctx.sabbath_status, SourceStatus::NotConsulted);
        assert!(ctx.has_estimated_windows());
    }

    /// CR-007: unpaid local entries do not make the day a paid holiday.
    #[test]
    fn test_cr_007_unpaid_entry_not_holiday() {
        let r = resolver(
            vec![holiday("2025-05-01", "Observance", false)],
            Arc::new(FakeHolidaySource(vec![])),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.resolve(date("2025-05-01"));
        assert!(!ctx.is_holiday);
    }

    /// CR-008: a Friday at month end still has its window resolved.
    #[test]
    fn test_cr_008_trailing_friday_window_present() {
        // 2025-10-31 is a Friday; the following Saturday is 2025-11-01.
        let r = resolver(
            vec![],
            Arc::new(FakeHolidaySource(vec![])),
            Arc::new(PreciseSabbathSource),
        );
        let ctx = r.month_context(2025, 10, false);
        let friday_evening = date("2025-10-31").and_hms_opt(20, 0, 0).unwrap();
        let midnight = date("2025-11-01").and_hms_opt(0, 0, 0).unwrap();
        assert!(ctx.window_overlapping(friday_evening, midnight).is_some());
    }

    #[test]
    fn test_saturdays_touching_march_2025() {
        let saturdays = saturdays_touching(2025, 3);
        assert_eq!(
            saturdays,
            vec![
                date("2025-03-01"),
                date("2025-03-08"),
                date("2025-03-15"),
                date("2025-03-22"),
                date("2025-03-29"),
            ]
        );
    }

    #[test]
    fn test_month_range_december_wraps_year() {
        let range = month_range(2025, 12);
        assert_eq!(range.start, date("2025-12-01"));
        assert_eq!(range.end, date("2026-01-01"));
    }
}
