//! Billing DTOs

use chrono::NaiveDate;
use pawbill_core::traits::BillingQuery;
use serde::Deserialize;
use uuid::Uuid;

/// Billing report request
///
/// The same body drives the JSON report and the CSV export, so the two
/// outputs always agree.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingReportRequest {
    /// Start of the period (inclusive)
    pub start_date: NaiveDate,

    /// End of the period (inclusive)
    pub end_date: NaiveDate,

    /// Restrict to one dog
    pub dog_id: Option<Uuid>,

    /// Restrict to one owner
    pub owner_id: Option<Uuid>,
}

impl BillingReportRequest {
    /// Convert into the engine's query type
    pub fn into_query(self) -> BillingQuery {
        BillingQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            dog_id: self.dog_id,
            owner_id: self.owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_query_preserves_fields() {
        let dog_id = Uuid::new_v4();
        let req = BillingReportRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            dog_id: Some(dog_id),
            owner_id: None,
        };

        let query = req.into_query();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(query.dog_id, Some(dog_id));
        assert_eq!(query.owner_id, None);
    }
}
