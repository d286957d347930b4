//! Rate handlers
//!
//! The rate table is an append-only history: entries are created and
//! deleted, never edited, so past billing periods stay reproducible.
//! There is no PATCH route by design.

use crate::dto::rate::{CreateRateRequest, RateQuery};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use pawbill_auth::{AdminUser, AuthenticatedUser};
use pawbill_core::models::Rate;
use pawbill_core::traits::{DogRepository, RateRepository, Repository};
use pawbill_core::AppError;
use pawbill_db::{PgDogRepository, PgRateRepository};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// List rate entries, newest effective date first
///
/// GET /api/v1/rates?dog_id=
///
/// Owners must name one of their own dogs; admins see everything.
#[instrument(skip(pool, user))]
pub async fn list_rates(
    pool: web::Data<PgPool>,
    query: web::Query<RateQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    if !user.is_admin() {
        let dog_id = query
            .dog_id
            .ok_or_else(|| AppError::MissingField("dog_id".to_string()))?;

        let dog_repo = PgDogRepository::new(pool.get_ref().clone());
        let dog = dog_repo
            .find_by_id(dog_id)
            .await?
            .ok_or_else(|| AppError::DogNotFound(dog_id.to_string()))?;

        if !dog.is_owned_by(user.user_id) {
            warn!(
                user_id = %user.user_id,
                dog_id = %dog_id,
                "User attempted to read rates of a dog they do not own"
            );
            return Err(AppError::Forbidden);
        }
    }

    debug!(dog_filter = ?query.dog_id, "Listing rates");

    let repo = PgRateRepository::new(pool.get_ref().clone());
    let rates = repo.list_filtered(query.dog_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(rates)))
}

/// Append a rate entry
///
/// POST /api/v1/rates
#[instrument(skip(pool, admin, req))]
pub async fn create_rate(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CreateRateRequest>,
) -> Result<HttpResponse, AppError> {
    if !req.check_rate() {
        warn!("Rate creation rejected: negative hourly rate");
        return Err(AppError::InvalidInput(
            "hourly_rate must not be negative".to_string(),
        ));
    }

    debug!(
        dog_id = %req.dog_id,
        effective_from = %req.effective_from,
        admin = %admin.user_id,
        "Creating rate"
    );

    let rate = Rate {
        id: Uuid::new_v4(),
        dog_id: req.dog_id,
        hourly_rate: req.hourly_rate,
        effective_from: req.effective_from,
        created_at: Utc::now(),
    };

    let repo = PgRateRepository::new(pool.get_ref().clone());
    let created = repo.create(&rate).await?;

    info!(
        rate_id = %created.id,
        dog_id = %created.dog_id,
        "Rate entry appended"
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// Delete a rate entry
///
/// DELETE /api/v1/rates/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_rate(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let rate_id = path.into_inner();
    debug!(rate_id = %rate_id, admin = %admin.user_id, "Deleting rate");

    let repo = PgRateRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(rate_id).await?;

    if deleted {
        info!(rate_id = %rate_id, admin = %admin.user_id, "Rate deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::RateNotFound(rate_id.to_string()))
    }
}

/// Configure rate routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rates")
            .route("", web::get().to(list_rates))
            .route("", web::post().to(create_rate))
            .route("/{id}", web::delete().to(delete_rate)),
    );
}
