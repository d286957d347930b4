//! Rate DTOs
//!
//! Rates are append-only: there is deliberately no update request type.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Rate creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRateRequest {
    /// Dog the rate applies to
    pub dog_id: Uuid,

    /// Hourly rate in euros
    pub hourly_rate: Decimal,

    /// First calendar date the rate is in force
    pub effective_from: NaiveDate,
}

impl CreateRateRequest {
    /// Rate must be non-negative (zero is a valid free-walk rate);
    /// validator's range check doesn't cover Decimal
    pub fn check_rate(&self) -> bool {
        self.hourly_rate >= Decimal::ZERO
    }
}

/// Rate list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RateQuery {
    /// Restrict to one dog
    pub dog_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_must_be_non_negative() {
        let mut req = CreateRateRequest {
            dog_id: Uuid::new_v4(),
            hourly_rate: dec!(25.00),
            effective_from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert!(req.check_rate());

        // A free walk is a legitimate history entry
        req.hourly_rate = dec!(0.00);
        assert!(req.check_rate());

        req.hourly_rate = dec!(-5.00);
        assert!(!req.check_rate());
    }
}
