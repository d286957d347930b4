//! Billing handlers
//!
//! Both endpoints run the same report computation; the CSV export is a
//! rendering of the JSON report, never a separate calculation.

use crate::dto::billing::BillingReportRequest;
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use pawbill_auth::AdminUser;
use pawbill_core::AppError;
use pawbill_db::PgBillingRepository;
use pawbill_services::BillingService;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

fn billing_service(pool: &PgPool) -> BillingService<PgBillingRepository> {
    BillingService::new(Arc::new(PgBillingRepository::new(pool.clone())))
}

/// Compute a billing report
///
/// POST /api/v1/billing/report
#[instrument(skip(pool, _admin, req))]
pub async fn billing_report(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    req: web::Json<BillingReportRequest>,
) -> Result<HttpResponse, AppError> {
    let query = req.into_inner().into_query();
    debug!(start = %query.start_date, end = %query.end_date, "Computing billing report");

    let report = billing_service(pool.get_ref()).report(&query).await?;

    info!(
        records = report.summary.total_records,
        total = %report.summary.total_amount,
        "Billing report computed"
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

/// Export a billing report as CSV
///
/// POST /api/v1/billing/export/csv
#[instrument(skip(pool, _admin, req))]
pub async fn billing_export_csv(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    req: web::Json<BillingReportRequest>,
) -> Result<HttpResponse, AppError> {
    let query = req.into_inner().into_query();
    debug!(start = %query.start_date, end = %query.end_date, "Exporting billing CSV");

    let export = billing_service(pool.get_ref()).export_csv(&query).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", export.filename),
        ))
        .body(export.content))
}

/// Configure billing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billing")
            .route("/report", web::post().to(billing_report))
            .route("/export/csv", web::post().to(billing_export_csv)),
    );
}
