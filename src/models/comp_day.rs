//! Compensatory day credits.
//!
//! Working a Sabbath or holiday earns one compensatory day off, consumed
//! later by a separate scheduling concern. The engine only *grants* credits;
//! granting is idempotent on (employee, date earned, reason).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Why a compensatory day was earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensatoryReason {
    /// Earned by working inside a Sabbath window.
    Sabbath,
    /// Earned by working on a paid holiday.
    Holiday,
}

/// An earned compensatory day off.
///
/// Invariant: `date_used`, if set, is neither before `date_earned` nor in
/// the future relative to the marking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensatoryDayCredit {
    /// The employee the credit belongs to.
    pub employee_id: String,
    /// The premium date that earned the credit.
    pub date_earned: NaiveDate,
    /// Why the credit was earned.
    pub reason: CompensatoryReason,
    /// The date the credit was consumed, if any.
    pub date_used: Option<NaiveDate>,
}

impl CompensatoryDayCredit {
    /// Creates an unused credit.
    pub fn new(employee_id: &str, date_earned: NaiveDate, reason: CompensatoryReason) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            date_earned,
            reason,
            date_used: None,
        }
    }

    /// Marks the credit as used on the given date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPeriod`] when `date_used` precedes
    /// `date_earned` or lies after `today`.
    pub fn mark_used(&mut self, date_used: NaiveDate, today: NaiveDate) -> EngineResult<()> {
        if date_used < self.date_earned {
            return Err(EngineError::InvalidPeriod {
                message: format!(
                    "compensatory day used on {} before it was earned on {}",
                    date_used, self.date_earned
                ),
            });
        }
        if date_used > today {
            return Err(EngineError::InvalidPeriod {
                message: format!("compensatory day use date {} is in the future", date_used),
            });
        }
        self.date_used = Some(date_used);
        Ok(())
    }
}

/// A sink for compensatory day credits with idempotent granting.
///
/// The engine grants through this trait; persistence lives outside the
/// crate. Granting the same (employee, date earned, reason) twice must be a
/// no-op, mirroring a unique constraint in the backing store.
pub trait CompensatoryDayLedger {
    /// Records a credit. Returns `true` if the credit was newly granted,
    /// `false` if an identical credit already existed.
    fn grant(&mut self, credit: CompensatoryDayCredit) -> bool;
}

/// An in-memory ledger, used by tests and single-run calculations.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    credits: Vec<CompensatoryDayCredit>,
    keys: BTreeSet<(String, NaiveDate, CompensatoryReason)>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the granted credits in grant order.
    pub fn credits(&self) -> &[CompensatoryDayCredit] {
        &self.credits
    }
}

impl CompensatoryDayLedger for InMemoryLedger {
    fn grant(&mut self, credit: CompensatoryDayCredit) -> bool {
        let key = (
            credit.employee_id.clone(),
            credit.date_earned,
            credit.reason,
        );
        if !self.keys.insert(key) {
            return false;
        }
        self.credits.push(credit);
        true
    }
}
