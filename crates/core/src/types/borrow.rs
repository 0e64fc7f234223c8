//! Borrow identifiers and active loan records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a single loan
///
/// Ids are handed out in strictly increasing order by the borrowing ledger,
/// starting from the default of 0.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BorrowId(u64);

impl BorrowId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for BorrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BorrowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// One copy of one book on loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub borrowed_date: DateTime<Utc>,
    pub borrow_id: BorrowId,
}

impl BorrowRecord {
    pub fn new(borrow_id: BorrowId, borrowed_date: DateTime<Utc>) -> Self {
        Self {
            borrowed_date,
            borrow_id,
        }
    }

    /// Fractional days elapsed between borrowing and `now`
    ///
    /// Negative when `now` precedes the borrow date.
    pub fn days_elapsed(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = now.signed_duration_since(self.borrowed_date);
        elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    /// Returns true if the loan has run longer than `max_days`
    pub fn is_overdue(&self, now: DateTime<Utc>, max_days: u32) -> bool {
        self.days_elapsed(now) > f64::from(max_days)
    }
}

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;
