//! Invitation handlers
//!
//! Registration is invitation-only: admins create invitations, the
//! public validation endpoint lets the registration form check a token
//! before submitting.

use crate::dto::invitation::{CreateInvitationRequest, ValidateInvitationResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use pawbill_auth::AdminUser;
use pawbill_core::config::AppConfig;
use pawbill_core::models::Invitation;
use pawbill_core::traits::{InvitationRepository, UserRepository};
use pawbill_core::AppError;
use pawbill_db::{PgInvitationRepository, PgUserRepository};
use rand::RngCore;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Generate a random 64-character hex invitation token
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// List all invitations, newest first
///
/// GET /api/v1/invitations
#[instrument(skip(pool, _admin))]
pub async fn list_invitations(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    debug!("Listing invitations");

    let repo = PgInvitationRepository::new(pool.get_ref().clone());
    let invitations = repo.find_all().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(invitations)))
}

/// Create an invitation
///
/// POST /api/v1/invitations
///
/// Rejected when the email already belongs to a user or has an active
/// invitation.
#[instrument(skip(pool, config, admin, req))]
pub async fn create_invitation(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    admin: AdminUser,
    req: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Invitation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim().to_lowercase();
    debug!(email = %email, admin = %admin.user_id, "Creating invitation");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    if user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::AlreadyExists(format!(
            "User {} already exists",
            email
        )));
    }

    let repo = PgInvitationRepository::new(pool.get_ref().clone());
    if repo.find_active_for_email(&email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "An active invitation for {} already exists",
            email
        )));
    }

    let invitation = Invitation {
        id: Uuid::new_v4(),
        email: email.clone(),
        token: generate_token(),
        created_by: admin.user_id,
        used_at: None,
        expires_at: Utc::now() + Duration::days(config.invitations.ttl_days),
        created_at: Utc::now(),
    };

    let created = repo.create(&invitation).await?;

    info!(
        invitation_id = %created.id,
        email = %created.email,
        admin = %admin.user_id,
        "Invitation created"
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// Delete an invitation
///
/// DELETE /api/v1/invitations/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_invitation(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let invitation_id = path.into_inner();
    debug!(invitation_id = %invitation_id, admin = %admin.user_id, "Deleting invitation");

    let repo = PgInvitationRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(invitation_id).await?;

    if deleted {
        info!(invitation_id = %invitation_id, "Invitation deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::InvitationNotFound(invitation_id.to_string()))
    }
}

/// Validate an invitation token
///
/// GET /api/v1/invitations/validate/{token}
///
/// Public endpoint used by the registration form.
#[instrument(skip(pool, path))]
pub async fn validate_invitation(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();

    let repo = PgInvitationRepository::new(pool.get_ref().clone());
    let response = match repo.find_by_token(&token).await? {
        None => ValidateInvitationResponse::invalid("unknown token"),
        Some(invitation) if invitation.is_used() => {
            ValidateInvitationResponse::invalid("already used")
        }
        Some(invitation) if invitation.is_expired() => {
            ValidateInvitationResponse::invalid("expired")
        }
        Some(invitation) => ValidateInvitationResponse::valid(invitation.email),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure invitation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/invitations")
            .route("", web::get().to(list_invitations))
            .route("", web::post().to(create_invitation))
            .route("/{id}", web::delete().to(delete_invitation))
            .route("/validate/{token}", web::get().to(validate_invitation)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
