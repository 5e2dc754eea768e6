//! Compensation strategies.
//!
//! Two interchangeable payment policies consume the classifier's tier
//! allocation for a day and produce a monetary total. The set is closed by
//! design: the rate law is a fixed, audited legal table, not an extension
//! point, so the strategy is a tagged enum selected once per profile.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayRules;
use crate::error::EngineResult;
use crate::models::{CompensationMode, CompensationProfile};

use super::classifier::{Tier, TierAllocation};

/// Pay earned in one tier on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPay {
    /// The tier.
    pub tier: Tier,
    /// Hours allocated to the tier.
    pub hours: Decimal,
    /// Pay earned in the tier.
    pub pay: Decimal,
}

/// The monetary outcome for one day segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPay {
    /// The calendar date.
    pub date: NaiveDate,
    /// Total pay for the segment.
    pub total: Decimal,
    /// The time-proportional base portion (equals `total` for hourly
    /// employees, whose pay has no separate base layer).
    pub base_component: Decimal,
    /// The premium-excess bonus portion (zero for hourly employees).
    pub bonus_component: Decimal,
    /// Per-tier pay lines.
    pub tier_pays: Vec<TierPay>,
    /// Warnings raised while paying the day (e.g. missing rate).
    pub warnings: Vec<String>,
}

impl DayPay {
    /// A zero-pay day that still carries the allocation's hour partition,
    /// so month-level hour accounting survives a missing rate.
    fn degraded(date: NaiveDate, allocation: &TierAllocation, warning: String) -> Self {
        let tier_pays = allocation
            .slices
            .iter()
            .map(|s| TierPay {
                tier: s.tier,
                hours: s.hours,
                pay: Decimal::ZERO,
            })
            .collect();
        Self {
            date,
            total: Decimal::ZERO,
            base_component: Decimal::ZERO,
            bonus_component: Decimal::ZERO,
            tier_pays,
            warnings: vec![warning],
        }
    }
}

/// A compensation policy: how a day's tier allocation becomes money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationStrategy {
    /// Every worked hour is paid in full at its tier's multiplier.
    Hourly {
        /// The base hourly rate; `None`/zero degrades to zero-pay days
        /// with warnings rather than failing the month.
        hourly_rate: Option<Decimal>,
    },
    /// A time-proportional share of the fixed monthly salary plus
    /// bonus-only premium deltas. The salary already covers 100% of every
    /// worked hour; only the excess over 100% is paid as a bonus.
    MonthlyProportional {
        /// The fixed monthly salary.
        monthly_base: Option<Decimal>,
        /// The legally defined average monthly hours (182).
        norm_hours: Decimal,
    },
}

impl CompensationStrategy {
    /// Selects the strategy for a profile, enforcing profile invariants
    /// and feature gates.
    ///
    /// # Errors
    ///
    /// Propagates [`CompensationProfile::validate`] failures, including
    /// rejection of feature-gated modes.
    pub fn for_profile(profile: &CompensationProfile, rules: &PayRules) -> EngineResult<Self> {
        profile.validate(&rules.features)?;
        Ok(match profile.mode {
            CompensationMode::Hourly => Self::Hourly {
                hourly_rate: profile.hourly_rate,
            },
            CompensationMode::MonthlySalary | CompensationMode::ProjectBased => {
                // ProjectBased only reaches here when its gate is enabled;
                // it pays like a monthly salary pending dedicated rules.
                Self::MonthlyProportional {
                    monthly_base: profile.monthly_base,
                    norm_hours: rules.rates.monthly_norm_hours,
                }
            }
        })
    }

    /// The strategy's stable name, recorded in result metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hourly { .. } => "hourly",
            Self::MonthlyProportional { .. } => "monthly_proportional",
        }
    }

    /// Computes the pay for one day segment's allocation.
    ///
    /// Never fails: a missing or zero rate yields a zero-value day with a
    /// warning annotation so the month always completes.
    pub fn pay_day(&self, date: NaiveDate, allocation: &TierAllocation) -> DayPay {
        match self {
            Self::Hourly { hourly_rate } => {
                let Some(rate) = positive(*hourly_rate) else {
                    return DayPay::degraded(
                        date,
                        allocation,
                        "Hourly rate missing or zero; day paid as zero".to_string(),
                    );
                };

                let tier_pays: Vec<TierPay> = allocation
                    .slices
                    .iter()
                    .map(|s| TierPay {
                        tier: s.tier,
                        hours: s.hours,
                        pay: s.hours * rate * s.multiplier,
                    })
                    .collect();
                let total: Decimal = tier_pays.iter().map(|t| t.pay).sum();

                DayPay {
                    date,
                    total,
                    base_component: total,
                    bonus_component: Decimal::ZERO,
                    tier_pays,
                    warnings: Vec::new(),
                }
            }
            Self::MonthlyProportional {
                monthly_base,
                norm_hours,
            } => {
                let Some(base) = positive(*monthly_base) else {
                    return DayPay::degraded(
                        date,
                        allocation,
                        "Monthly base salary missing or zero; day paid as zero".to_string(),
                    );
                };
                let hourly_equivalent = base / *norm_hours;

                let mut tier_pays = Vec::with_capacity(allocation.slices.len());
                let mut base_component = Decimal::ZERO;
                let mut total = Decimal::ZERO;
                for s in &allocation.slices {
                    let full = s.hours * hourly_equivalent * s.multiplier;
                    base_component += s.hours * hourly_equivalent;
                    total += full;
                    tier_pays.push(TierPay {
                        tier: s.tier,
                        hours: s.hours,
                        pay: full,
                    });
                }

                DayPay {
                    date,
                    total,
                    base_component,
                    bonus_component: total - base_component,
                    tier_pays,
                    warnings: Vec::new(),
                }
            }
        }
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}
