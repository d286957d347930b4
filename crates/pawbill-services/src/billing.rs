//! Billing engine
//!
//! Turns completed, attended walks into billing reports: resolves the
//! hourly rate that was in force on each walk date, computes per-record
//! amounts, and renders the same data as JSON-friendly structs or CSV.
//!
//! The arithmetic lives in pure functions over data the repository
//! fetched, so every billing rule is unit-testable without Postgres.

use async_trait::async_trait;
use chrono::NaiveDate;
use pawbill_core::{
    models::Rate,
    traits::{BillableRow, BillingQuery, BillingRepository},
    AppError, AppResult,
};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Minutes per hour, as a Decimal for exact division
const MINUTES_PER_HOUR: Decimal = dec!(60);

/// One billed attendance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingRecord {
    pub dog_id: Uuid,
    pub dog_name: String,
    pub owner_name: String,
    pub date: NaiveDate,
    pub duration: i32,
    pub hourly_rate: Decimal,
    pub amount: Decimal,
}

/// Aggregate totals over a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingSummary {
    pub total_records: usize,
    pub total_duration: i64,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Full billing report: records plus summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingReport {
    pub records: Vec<BillingRecord>,
    pub summary: BillingSummary,
}

/// Rendered CSV export with its download filename
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Round a monetary value half-up to exactly two decimal places
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Resolve the hourly rate in force on a given date
///
/// Picks the entry with the latest `effective_from` not after `on`;
/// among entries sharing that date, the newest `created_at` wins.
/// Returns zero when no entry applies.
pub fn resolve_rate(history: &[Rate], on: NaiveDate) -> Decimal {
    history
        .iter()
        .filter(|rate| rate.effective_from <= on)
        .max_by(|a, b| {
            a.effective_from
                .cmp(&b.effective_from)
                .then(a.created_at.cmp(&b.created_at))
        })
        .map(|rate| rate.hourly_rate)
        .unwrap_or(Decimal::ZERO)
}

/// Compute billing records from billable rows and per-dog rate histories
///
/// Preserves the input row order. `amount = round2(duration / 60 * rate)`,
/// rounding applied to the amount only.
pub fn compute_records(
    rows: &[BillableRow],
    histories: &HashMap<Uuid, Vec<Rate>>,
) -> Vec<BillingRecord> {
    static EMPTY: Vec<Rate> = Vec::new();

    rows.iter()
        .map(|row| {
            let history = histories.get(&row.dog_id).unwrap_or(&EMPTY);
            let hourly_rate = resolve_rate(history, row.walk_date);
            let amount =
                round_money(Decimal::from(row.duration_minutes) / MINUTES_PER_HOUR * hourly_rate);

            BillingRecord {
                dog_id: row.dog_id,
                dog_name: row.dog_name.clone(),
                owner_name: row.owner_name.clone(),
                date: row.walk_date,
                duration: row.duration_minutes,
                hourly_rate: round_money(hourly_rate),
                amount,
            }
        })
        .collect()
}

/// Compute the summary over already-rounded records
///
/// `total_amount` re-rounds the sum of rounded amounts; `total_duration`
/// is the plain integer-minute sum.
pub fn compute_summary(
    records: &[BillingRecord],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> BillingSummary {
    let total_amount = round_money(records.iter().map(|r| r.amount).sum());
    let total_duration = records.iter().map(|r| i64::from(r.duration)).sum();

    BillingSummary {
        total_records: records.len(),
        total_duration,
        total_amount,
        start_date,
        end_date,
    }
}

/// Quote a CSV field if it contains the delimiter, a quote, or a line break
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render billing records as CSV, one row per record
pub fn render_csv(records: &[BillingRecord]) -> String {
    let mut csv = String::from("Datum,Hund,Besitzer,Dauer (Min),Stundensatz (€),Betrag (€)\n");

    for record in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            record.date.format("%Y-%m-%d"),
            escape_csv_field(&record.dog_name),
            escape_csv_field(&record.owner_name),
            record.duration,
            record.hourly_rate,
            record.amount,
        ));
    }

    csv
}

/// Billing service orchestrating repository fetches and report computation
pub struct BillingService<R: BillingRepository> {
    repo: Arc<R>,
}

impl<R: BillingRepository> BillingService<R> {
    /// Create a new billing service
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn validate_query(query: &BillingQuery) -> AppResult<()> {
        if query.start_date > query.end_date {
            return Err(AppError::Validation(format!(
                "start_date {} is after end_date {}",
                query.start_date, query.end_date
            )));
        }
        Ok(())
    }

    async fn fetch_inputs(
        &self,
        query: &BillingQuery,
    ) -> AppResult<(Vec<BillableRow>, HashMap<Uuid, Vec<Rate>>)> {
        let rows = self.repo.list_billable(query).await?;

        let mut dog_ids: Vec<Uuid> = rows.iter().map(|r| r.dog_id).collect();
        dog_ids.sort();
        dog_ids.dedup();

        let mut histories: HashMap<Uuid, Vec<Rate>> = HashMap::new();
        for rate in self.repo.rate_history(&dog_ids).await? {
            histories.entry(rate.dog_id).or_default().push(rate);
        }

        Ok((rows, histories))
    }

    /// Compute a billing report for the query
    #[instrument(skip(self))]
    pub async fn report(&self, query: &BillingQuery) -> AppResult<BillingReport> {
        Self::validate_query(query)?;

        let (rows, histories) = self.fetch_inputs(query).await?;
        let records = compute_records(&rows, &histories);
        let summary = compute_summary(&records, query.start_date, query.end_date);

        debug!(
            "Billing report: {} records, total {}",
            summary.total_records, summary.total_amount
        );

        Ok(BillingReport { records, summary })
    }

    /// Render the same report as a CSV download
    #[instrument(skip(self))]
    pub async fn export_csv(&self, query: &BillingQuery) -> AppResult<CsvExport> {
        let report = self.report(query).await?;

        Ok(CsvExport {
            filename: format!("billing-{}-{}.csv", query.start_date, query.end_date),
            content: render_csv(&report.records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate_entry(dog_id: Uuid, hourly: Decimal, from: NaiveDate, created_offset: i64) -> Rate {
        Rate {
            id: Uuid::new_v4(),
            dog_id,
            hourly_rate: hourly,
            effective_from: from,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::seconds(created_offset),
        }
    }

    fn row(dog_id: Uuid, name: &str, owner: &str, on: NaiveDate, minutes: i32) -> BillableRow {
        BillableRow {
            dog_id,
            dog_name: name.to_string(),
            owner_name: owner.to_string(),
            walk_date: on,
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_resolve_rate_picks_latest_applicable() {
        let dog = Uuid::new_v4();
        let history = vec![
            rate_entry(dog, dec!(20.00), date(2024, 1, 1), 0),
            rate_entry(dog, dec!(25.00), date(2024, 3, 1), 1),
            rate_entry(dog, dec!(30.00), date(2024, 6, 1), 2),
        ];

        assert_eq!(resolve_rate(&history, date(2024, 2, 15)), dec!(20.00));
        assert_eq!(resolve_rate(&history, date(2024, 3, 1)), dec!(25.00));
        assert_eq!(resolve_rate(&history, date(2024, 5, 31)), dec!(25.00));
        assert_eq!(resolve_rate(&history, date(2025, 1, 1)), dec!(30.00));
    }

    #[test]
    fn test_resolve_rate_ignores_future_entries() {
        let dog = Uuid::new_v4();
        let history = vec![rate_entry(dog, dec!(40.00), date(2024, 6, 1), 0)];

        // The winning entry's effective_from never exceeds the query date
        assert_eq!(resolve_rate(&history, date(2024, 5, 31)), Decimal::ZERO);
    }

    #[test]
    fn test_resolve_rate_no_history_is_zero() {
        assert_eq!(resolve_rate(&[], date(2024, 6, 1)), Decimal::ZERO);
    }

    #[test]
    fn test_resolve_rate_same_day_tie_break() {
        let dog = Uuid::new_v4();
        // Two entries effective on the same day: the newest created wins
        let history = vec![
            rate_entry(dog, dec!(22.00), date(2024, 3, 1), 0),
            rate_entry(dog, dec!(28.00), date(2024, 3, 1), 100),
        ];

        assert_eq!(resolve_rate(&history, date(2024, 3, 5)), dec!(28.00));
    }

    #[test]
    fn test_amount_90_minutes_at_25() {
        let dog = Uuid::new_v4();
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        )]);
        let rows = vec![row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 90)];

        let records = compute_records(&rows, &histories);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, dec!(37.50));
        assert_eq!(records[0].amount.to_string(), "37.50");
        assert_eq!(records[0].hourly_rate.to_string(), "25.00");
    }

    #[test]
    fn test_amount_rounds_half_up() {
        let dog = Uuid::new_v4();
        // 25 min at 25.00/h = 10.41666... -> 10.42
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        )]);
        let rows = vec![row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 25)];

        let records = compute_records(&rows, &histories);
        assert_eq!(records[0].amount, dec!(10.42));
    }

    #[test]
    fn test_missing_history_bills_zero() {
        let dog = Uuid::new_v4();
        let rows = vec![row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 60)];

        let records = compute_records(&rows, &HashMap::new());
        assert_eq!(records[0].hourly_rate, dec!(0.00));
        assert_eq!(records[0].amount, dec!(0.00));
    }

    #[test]
    fn test_summary_totals_from_rounded_amounts() {
        let dog = Uuid::new_v4();
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        )]);
        // Two 25-minute walks: each rounds to 10.42, total 20.84
        // (the unrounded total would round to 20.83)
        let rows = vec![
            row(dog, "Rex", "Anna Schmidt", date(2024, 6, 2), 25),
            row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 25),
        ];

        let records = compute_records(&rows, &histories);
        let summary = compute_summary(&records, date(2024, 6, 1), date(2024, 6, 30));

        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_duration, 50);
        assert_eq!(summary.total_amount, dec!(20.84));
    }

    #[test]
    fn test_records_keep_retrieval_order() {
        let dog = Uuid::new_v4();
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        )]);
        let rows = vec![
            row(dog, "Rex", "Anna Schmidt", date(2024, 6, 15), 30),
            row(dog, "Rex", "Anna Schmidt", date(2024, 6, 10), 45),
            row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 60),
        ];

        let records = compute_records(&rows, &histories);
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 6, 15), date(2024, 6, 10), date(2024, 6, 1)]
        );
    }

    #[test]
    fn test_csv_header_and_row() {
        let dog = Uuid::new_v4();
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        )]);
        let rows = vec![row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 90)];
        let records = compute_records(&rows, &histories);

        let csv = render_csv(&records);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Datum,Hund,Besitzer,Dauer (Min),Stundensatz (€),Betrag (€)")
        );
        assert_eq!(lines.next(), Some("2024-06-01,Rex,Anna Schmidt,90,25.00,37.50"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_escapes_delimiters_and_quotes() {
        let dog = Uuid::new_v4();
        let rows = vec![row(
            dog,
            "Bello, Jr.",
            "Maria \"Mia\" Weber",
            date(2024, 6, 1),
            60,
        )];
        let records = compute_records(&rows, &HashMap::new());

        let csv = render_csv(&records);
        let data_line = csv.lines().nth(1).unwrap();
        assert!(data_line.contains("\"Bello, Jr.\""));
        assert!(data_line.contains("\"Maria \"\"Mia\"\" Weber\""));
    }

    #[test]
    fn test_csv_and_report_agree() {
        let dog = Uuid::new_v4();
        let histories = HashMap::from([(
            dog,
            vec![rate_entry(dog, dec!(18.50), date(2024, 1, 1), 0)],
        )]);
        let rows = vec![row(dog, "Luna", "Jonas Braun", date(2024, 6, 20), 75)];
        let records = compute_records(&rows, &histories);

        let csv = render_csv(&records);
        let data_line = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = data_line.split(',').collect();

        assert_eq!(fields[0], records[0].date.format("%Y-%m-%d").to_string());
        assert_eq!(fields[1], records[0].dog_name);
        assert_eq!(fields[2], records[0].owner_name);
        assert_eq!(fields[3], records[0].duration.to_string());
        assert_eq!(fields[4], records[0].hourly_rate.to_string());
        assert_eq!(fields[5], records[0].amount.to_string());
    }

    #[test]
    fn test_round_money_pads_scale() {
        assert_eq!(round_money(dec!(5)).to_string(), "5.00");
        assert_eq!(round_money(dec!(5.5)).to_string(), "5.50");
        assert_eq!(round_money(dec!(5.555)).to_string(), "5.56");
        assert_eq!(round_money(dec!(5.554)).to_string(), "5.55");
    }

    // -------- BillingService over a mock repository --------

    struct MockBillingRepo {
        rows: Vec<BillableRow>,
        rates: Vec<Rate>,
    }

    #[async_trait]
    impl BillingRepository for MockBillingRepo {
        async fn list_billable(&self, query: &BillingQuery) -> AppResult<Vec<BillableRow>> {
            let mut rows: Vec<BillableRow> = self
                .rows
                .iter()
                .filter(|r| r.walk_date >= query.start_date && r.walk_date <= query.end_date)
                .filter(|r| query.dog_id.map_or(true, |id| r.dog_id == id))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.walk_date.cmp(&a.walk_date));
            Ok(rows)
        }

        async fn rate_history(&self, dog_ids: &[Uuid]) -> AppResult<Vec<Rate>> {
            Ok(self
                .rates
                .iter()
                .filter(|r| dog_ids.contains(&r.dog_id))
                .cloned()
                .collect())
        }
    }

    fn query(start: NaiveDate, end: NaiveDate) -> BillingQuery {
        BillingQuery {
            start_date: start,
            end_date: end,
            dog_id: None,
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_service_report() {
        let dog = Uuid::new_v4();
        let repo = MockBillingRepo {
            rows: vec![
                row(dog, "Rex", "Anna Schmidt", date(2024, 6, 1), 90),
                row(dog, "Rex", "Anna Schmidt", date(2024, 7, 1), 90),
            ],
            rates: vec![rate_entry(dog, dec!(25.00), date(2024, 1, 1), 0)],
        };
        let service = BillingService::new(Arc::new(repo));

        let report = service
            .report(&query(date(2024, 6, 1), date(2024, 6, 30)))
            .await
            .unwrap();

        // The July walk falls outside the range
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.summary.total_amount, dec!(37.50));
        assert_eq!(report.summary.total_duration, 90);
    }

    #[tokio::test]
    async fn test_service_dog_filter() {
        let rex = Uuid::new_v4();
        let luna = Uuid::new_v4();
        let repo = MockBillingRepo {
            rows: vec![
                row(rex, "Rex", "Anna Schmidt", date(2024, 6, 1), 60),
                row(luna, "Luna", "Jonas Braun", date(2024, 6, 1), 60),
            ],
            rates: vec![
                rate_entry(rex, dec!(20.00), date(2024, 1, 1), 0),
                rate_entry(luna, dec!(30.00), date(2024, 1, 1), 0),
            ],
        };
        let service = BillingService::new(Arc::new(repo));

        let mut q = query(date(2024, 6, 1), date(2024, 6, 30));
        q.dog_id = Some(luna);
        let report = service.report(&q).await.unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].dog_id, luna);
        assert_eq!(report.summary.total_amount, dec!(30.00));
    }

    #[tokio::test]
    async fn test_service_rejects_inverted_range() {
        let repo = MockBillingRepo {
            rows: vec![],
            rates: vec![],
        };
        let service = BillingService::new(Arc::new(repo));

        let result = service
            .report(&query(date(2024, 7, 1), date(2024, 6, 1)))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_service_csv_filename() {
        let repo = MockBillingRepo {
            rows: vec![],
            rates: vec![],
        };
        let service = BillingService::new(Arc::new(repo));

        let export = service
            .export_csv(&query(date(2024, 6, 1), date(2024, 6, 30)))
            .await
            .unwrap();
        assert_eq!(export.filename, "billing-2024-06-01-2024-06-30.csv");
        assert!(export
            .content
            .starts_with("Datum,Hund,Besitzer,Dauer (Min)"));
    }
}
