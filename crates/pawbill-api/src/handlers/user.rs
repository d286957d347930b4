//! User management handlers
//!
//! Admins manage all accounts; owners may read and edit their own.

use crate::dto::user::UpdateUserRequest;
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use pawbill_auth::{AdminUser, AuthenticatedUser};
use pawbill_core::models::UserInfo;
use pawbill_core::traits::Repository;
use pawbill_core::AppError;
use pawbill_db::PgUserRepository;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// List all users
///
/// GET /api/v1/users
#[instrument(skip(pool, _admin))]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    debug!("Listing users");

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let users = repo.find_all().await?;

    let response: Vec<UserInfo> = users.iter().map(UserInfo::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Get one user
///
/// GET /api/v1/users/{id}
///
/// Owners may only read their own account.
#[instrument(skip(pool, user))]
pub async fn get_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if user_id != user.user_id && !user.is_admin() {
        warn!(
            user_id = %user.user_id,
            target = %user_id,
            "User attempted to read another account"
        );
        return Err(AppError::Forbidden);
    }

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let found = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(&found))))
}

/// Update a user's name or phone
///
/// PATCH /api/v1/users/{id}
///
/// Owners may only edit their own account; email, role, and password are
/// not editable here.
#[instrument(skip(pool, user, req))]
pub async fn update_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("User update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let user_id = path.into_inner();

    if user_id != user.user_id && !user.is_admin() {
        warn!(
            user_id = %user.user_id,
            target = %user_id,
            "User attempted to edit another account"
        );
        return Err(AppError::Forbidden);
    }

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let mut db_user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    if let Some(first_name) = &req.first_name {
        db_user.first_name = first_name.clone();
    }
    if let Some(last_name) = &req.last_name {
        db_user.last_name = last_name.clone();
    }
    if let Some(phone) = &req.phone {
        db_user.phone = Some(phone.clone());
    }

    let updated = repo.update(&db_user).await?;

    info!(user_id = %updated.id, "User updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(&updated))))
}

/// Delete a user
///
/// DELETE /api/v1/users/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if user_id == admin.user_id {
        return Err(AppError::Conflict(
            "Cannot delete your own account".to_string(),
        ));
    }

    debug!(target = %user_id, admin = %admin.user_id, "Deleting user");

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(user_id).await?;

    if deleted {
        info!(target = %user_id, admin = %admin.user_id, "User deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::UserNotFound(user_id.to_string()))
    }
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::patch().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
