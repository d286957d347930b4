//! Walk scheduling handlers
//!
//! Admins create and drive walks through their lifecycle; owners can
//! read walks that include one of their dogs. Lifecycle endpoints answer
//! 409 when the walk is not in the required state.

use crate::dto::walk::{
    AttendanceUpdateRequest, CreateWalkRequest, UpdateWalkRequest, WalkQuery,
};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use pawbill_auth::{AdminUser, AuthenticatedUser};
use pawbill_core::models::Walk;
use pawbill_core::traits::{DogRepository, WalkRepository};
use pawbill_core::AppError;
use pawbill_db::{PgDogRepository, PgWalkRepository};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Whether a walk's roster includes any of the given dogs
fn includes_any_dog(walk: &Walk, dog_ids: &[Uuid]) -> bool {
    walk.attendances
        .iter()
        .any(|a| dog_ids.contains(&a.dog_id))
}

/// List walks
///
/// GET /api/v1/walks?start_date=&end_date=&dog_id=
///
/// Owners only see walks that include at least one of their dogs.
#[instrument(skip(pool, user))]
pub async fn list_walks(
    pool: web::Data<PgPool>,
    query: web::Query<WalkQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let repo = PgWalkRepository::new(pool.get_ref().clone());

    let walks = if user.is_admin() {
        let dog_filter = query.dog_id.map(|id| vec![id]);
        repo.list_filtered(query.start_date, query.end_date, dog_filter.as_deref())
            .await?
    } else {
        let dog_repo = PgDogRepository::new(pool.get_ref().clone());
        let mut own_dogs = dog_repo.ids_for_owner(user.user_id).await?;

        if let Some(dog_id) = query.dog_id {
            if !own_dogs.contains(&dog_id) {
                warn!(
                    user_id = %user.user_id,
                    dog_id = %dog_id,
                    "User attempted to filter walks by a dog they do not own"
                );
                return Err(AppError::Forbidden);
            }
            own_dogs = vec![dog_id];
        }

        if own_dogs.is_empty() {
            return Ok(HttpResponse::Ok().json(ApiResponse::success(Vec::<Walk>::new())));
        }

        repo.list_filtered(query.start_date, query.end_date, Some(&own_dogs))
            .await?
    };

    debug!("Listing walks: {} found", walks.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(walks)))
}

/// Get one walk with its roster
///
/// GET /api/v1/walks/{id}
#[instrument(skip(pool, user))]
pub async fn get_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let walk_id = path.into_inner();

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo
        .find_with_attendances(walk_id)
        .await?
        .ok_or_else(|| AppError::WalkNotFound(walk_id.to_string()))?;

    if !user.is_admin() {
        let dog_repo = PgDogRepository::new(pool.get_ref().clone());
        let own_dogs = dog_repo.ids_for_owner(user.user_id).await?;
        if !includes_any_dog(&walk, &own_dogs) {
            warn!(
                user_id = %user.user_id,
                walk_id = %walk_id,
                "User attempted to read a walk without their dogs"
            );
            return Err(AppError::Forbidden);
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// Create a walk with a roster
///
/// POST /api/v1/walks
#[instrument(skip(pool, admin, req))]
pub async fn create_walk(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CreateWalkRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Walk creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        date = %req.date,
        dogs = req.dog_ids.len(),
        admin = %admin.user_id,
        "Creating walk"
    );

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo
        .create_with_roster(req.date, admin.user_id, req.notes.as_deref(), &req.dog_ids)
        .await?;

    info!(walk_id = %walk.id, date = %walk.date, "Walk created");
    Ok(HttpResponse::Created().json(ApiResponse::success(walk)))
}

/// Update a walk's date, notes, or roster
///
/// PATCH /api/v1/walks/{id}
#[instrument(skip(pool, _admin, req))]
pub async fn update_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    _admin: AdminUser,
    req: web::Json<UpdateWalkRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Walk update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let walk_id = path.into_inner();
    let repo = PgWalkRepository::new(pool.get_ref().clone());

    let mut walk = if req.date.is_some() || req.notes.is_some() {
        repo.update_details(walk_id, req.date, req.notes.as_deref())
            .await?
    } else {
        repo.find_with_attendances(walk_id)
            .await?
            .ok_or_else(|| AppError::WalkNotFound(walk_id.to_string()))?
    };

    if let Some(dog_ids) = &req.dog_ids {
        walk = repo.replace_roster(walk_id, dog_ids).await?;
    }

    info!(walk_id = %walk.id, "Walk updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// Delete a walk and its roster
///
/// DELETE /api/v1/walks/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let walk_id = path.into_inner();
    debug!(walk_id = %walk_id, admin = %admin.user_id, "Deleting walk");

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(walk_id).await?;

    if deleted {
        info!(walk_id = %walk_id, admin = %admin.user_id, "Walk deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::WalkNotFound(walk_id.to_string()))
    }
}

/// Start a scheduled walk
///
/// POST /api/v1/walks/{id}/start
#[instrument(skip(pool, admin))]
pub async fn start_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let walk_id = path.into_inner();
    debug!(walk_id = %walk_id, admin = %admin.user_id, "Starting walk");

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo.start(walk_id).await?;

    info!(walk_id = %walk.id, "Walk started");
    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// End a running walk
///
/// POST /api/v1/walks/{id}/end
///
/// Stamps the shared duration on every attended roster row.
#[instrument(skip(pool, admin))]
pub async fn end_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let walk_id = path.into_inner();
    debug!(walk_id = %walk_id, admin = %admin.user_id, "Ending walk");

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo.complete(walk_id).await?;

    info!(walk_id = %walk.id, "Walk completed");
    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// Cancel a walk
///
/// POST /api/v1/walks/{id}/cancel
#[instrument(skip(pool, admin))]
pub async fn cancel_walk(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let walk_id = path.into_inner();
    debug!(walk_id = %walk_id, admin = %admin.user_id, "Cancelling walk");

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo.cancel(walk_id).await?;

    info!(walk_id = %walk.id, "Walk cancelled");
    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// Mark a dog present or absent
///
/// PATCH /api/v1/walks/{walk_id}/attendance/{dog_id}
#[instrument(skip(pool, admin, req))]
pub async fn update_attendance(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    admin: AdminUser,
    req: web::Json<AttendanceUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let (walk_id, dog_id) = path.into_inner();
    debug!(
        walk_id = %walk_id,
        dog_id = %dog_id,
        attended = req.attended,
        admin = %admin.user_id,
        "Updating attendance"
    );

    let repo = PgWalkRepository::new(pool.get_ref().clone());
    let walk = repo.set_attendance(walk_id, dog_id, req.attended).await?;

    info!(walk_id = %walk_id, dog_id = %dog_id, "Attendance updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success(walk)))
}

/// Configure walk routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/walks")
            .route("", web::get().to(list_walks))
            .route("", web::post().to(create_walk))
            .route("/{id}", web::get().to(get_walk))
            .route("/{id}", web::patch().to(update_walk))
            .route("/{id}", web::delete().to(delete_walk))
            .route("/{id}/start", web::post().to(start_walk))
            .route("/{id}/end", web::post().to(end_walk))
            .route("/{id}/cancel", web::post().to(cancel_walk))
            .route(
                "/{walk_id}/attendance/{dog_id}",
                web::patch().to(update_attendance),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pawbill_core::models::{Attendance, WalkStatus};

    #[test]
    fn test_includes_any_dog() {
        let dog_a = Uuid::new_v4();
        let dog_b = Uuid::new_v4();
        let walk = Walk {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            status: WalkStatus::Scheduled,
            admin_id: Uuid::new_v4(),
            notes: None,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
            attendances: vec![Attendance {
                dog_id: dog_a,
                ..Default::default()
            }],
        };

        assert!(includes_any_dog(&walk, &[dog_a, dog_b]));
        assert!(!includes_any_dog(&walk, &[dog_b]));
        assert!(!includes_any_dog(&walk, &[]));
    }
}
