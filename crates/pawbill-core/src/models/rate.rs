//! Rate model
//!
//! Hourly rates form an append-only, effective-dated history per dog.
//! The rate that applies to a walk is the one with the latest
//! `effective_from` not after the walk's date. Rows are never amended in
//! place; corrections are new rows, where the newest created wins a tie
//! on `effective_from`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hourly rate entry in a dog's rate history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    /// Unique identifier
    pub id: Uuid,

    /// Dog this rate belongs to
    pub dog_id: Uuid,

    /// Hourly rate (non-negative)
    pub hourly_rate: Decimal,

    /// Calendar date from which this rate applies (inclusive)
    pub effective_from: NaiveDate,

    /// Creation timestamp (tie-break: newest created wins)
    pub created_at: DateTime<Utc>,
}

impl Rate {
    /// Check whether this rate is applicable on the given date
    #[inline]
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            dog_id: Uuid::new_v4(),
            hourly_rate: Decimal::ZERO,
            effective_from: Utc::now().date_naive(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_on() {
        let rate = Rate {
            effective_from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ..Default::default()
        };

        assert!(rate.applies_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(rate.applies_on(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()));
        assert!(!rate.applies_on(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
    }
}
