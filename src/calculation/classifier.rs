//! Rate classification — the central algorithm.
//!
//! For a given day segment, classifies worked hours into an ordered set of
//! tiers using cumulative-hour thresholds, and assigns each tier its
//! multiplier. The partition is greedy and strict: regular, then
//! overtime-1, then overtime-2, each tier absorbing
//! `min(remaining_hours, tier_capacity)`. The same partition logic applies
//! to ordinary and premium days; only the threshold/multiplier table
//! differs.
//!
//! Thresholds are cumulative per calendar date, not per segment: when a
//! date splits into an ordinary and a Sabbath segment, hours already worked
//! earlier on the date consume the day's tier capacities
//! ([`classify_after`]), so a long Friday pushes its Sabbath hours straight
//! into the premium overtime tiers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateRules;
use crate::models::DaySegment;

/// A named band of hours within a day paying a fixed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Ordinary hours at 100%.
    Regular,
    /// Ordinary overtime, first span (125%).
    Overtime1,
    /// Ordinary overtime beyond the first span (150%).
    Overtime2,
    /// Sabbath hours within the regular threshold (150%).
    SabbathRegular,
    /// Sabbath overtime, first span (175%).
    SabbathOvertime1,
    /// Sabbath overtime beyond the first span (200%).
    SabbathOvertime2,
    /// Holiday hours within the regular threshold (150%).
    HolidayRegular,
    /// Holiday overtime, first span (175%).
    HolidayOvertime1,
    /// Holiday overtime beyond the first span (200%).
    HolidayOvertime2,
}

impl Tier {
    /// The tier's stable name, used as the breakdown key.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Regular => "regular",
            Tier::Overtime1 => "overtime_1",
            Tier::Overtime2 => "overtime_2",
            Tier::SabbathRegular => "sabbath_regular",
            Tier::SabbathOvertime1 => "sabbath_overtime_1",
            Tier::SabbathOvertime2 => "sabbath_overtime_2",
            Tier::HolidayRegular => "holiday_regular",
            Tier::HolidayOvertime1 => "holiday_overtime_1",
            Tier::HolidayOvertime2 => "holiday_overtime_2",
        }
    }

    /// True for the first tier of each table (hours within the regular
    /// threshold).
    pub fn is_regular(&self) -> bool {
        matches!(
            self,
            Tier::Regular | Tier::SabbathRegular | Tier::HolidayRegular
        )
    }

    /// True for any overtime tier, ordinary or premium.
    pub fn is_overtime(&self) -> bool {
        !self.is_regular()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One band of the day's tier allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSlice {
    /// The tier.
    pub tier: Tier,
    /// Hours allocated to the tier (may be zero).
    pub hours: Decimal,
    /// The tier's pay multiplier.
    pub multiplier: Decimal,
}

/// The ordered tier allocation for one day segment.
///
/// Always contains all three slices of the active table, in priority
/// order, so a zero-hour segment yields an all-zero allocation rather than
/// omitted entries.
///
/// Invariant: slice hours sum exactly to the segment's total hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAllocation {
    /// The tier slices, in allocation order.
    pub slices: Vec<TierSlice>,
}

impl TierAllocation {
    /// Total hours across all slices.
    pub fn total_hours(&self) -> Decimal {
        self.slices.iter().map(|s| s.hours).sum()
    }
}

/// Classifies a day segment's hours into its tier allocation.
///
/// Table precedence is explicit: a Sabbath day (including a combined
/// Sabbath+holiday day) uses the Sabbath table exactly once; a holiday-only
/// day uses the holiday table; otherwise the ordinary table applies. No
/// premium stacking ever occurs.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{Tier, classify};
/// use payroll_engine::config::PayRules;
/// use payroll_engine::models::DaySegment;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rules = PayRules::israeli_default();
/// let segment = DaySegment {
///     date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
///     total_hours: Decimal::from_str("10.0").unwrap(),
///     is_sabbath: false,
///     is_holiday: false,
///     is_night: false,
/// };
///
/// let allocation = classify(&segment, &rules.rates);
/// assert_eq!(allocation.slices[0].tier, Tier::Regular);
/// assert_eq!(allocation.slices[0].hours, Decimal::from_str("8.6").unwrap());
/// assert_eq!(allocation.slices[1].tier, Tier::Overtime1);
/// assert_eq!(allocation.slices[1].hours, Decimal::from_str("1.4").unwrap());
/// ```
pub fn classify(segment: &DaySegment, rules: &RateRules) -> TierAllocation {
    classify_after(segment, Decimal::ZERO, rules)
}

/// Classifies a segment given hours already worked earlier on the same
/// calendar date.
///
/// Thresholds apply cumulatively across all worked hours for the date:
/// `prior_hours` consumes tier capacity before this segment's hours are
/// allocated, so a segment starting beyond the regular threshold lands
/// directly in the overtime tiers of its table.
pub fn classify_after(
    segment: &DaySegment,
    prior_hours: Decimal,
    rules: &RateRules,
) -> TierAllocation {
    let (tiers, multipliers) = if segment.is_sabbath {
        (
            [
                Tier::SabbathRegular,
                Tier::SabbathOvertime1,
                Tier::SabbathOvertime2,
            ],
            &rules.premium,
        )
    } else if segment.is_holiday {
        (
            [
                Tier::HolidayRegular,
                Tier::HolidayOvertime1,
                Tier::HolidayOvertime2,
            ],
            &rules.premium,
        )
    } else {
        (
            [Tier::Regular, Tier::Overtime1, Tier::Overtime2],
            &rules.ordinary,
        )
    };

    // Remaining band capacities after the hours already worked today.
    let regular_threshold = rules.thresholds.regular_hours(segment.is_night);
    let overtime_1_end = regular_threshold + rules.thresholds.overtime_tier1_span;
    let capacities = [
        Some((regular_threshold - prior_hours).max(Decimal::ZERO)),
        Some((overtime_1_end - prior_hours.max(regular_threshold)).max(Decimal::ZERO)),
        None,
    ];
    let tier_multipliers = [
        multipliers.regular,
        multipliers.overtime_1,
        multipliers.overtime_2,
    ];

    let mut remaining = segment.total_hours;
    let mut slices = Vec::with_capacity(3);
    for ((tier, capacity), multiplier) in tiers.iter().zip(capacities).zip(tier_multipliers) {
        let hours = match capacity {
            Some(cap) => remaining.min(cap),
            None => remaining,
        };
        remaining -= hours;
        slices.push(TierSlice {
            tier: *tier,
            hours,
            multiplier,
        });
    }

    TierAllocation { slices }
}
