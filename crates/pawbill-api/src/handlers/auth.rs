//! Authentication handlers
//!
//! HTTP handlers for login, logout, current-user lookup, and
//! invitation-gated self-registration.

use crate::dto::auth::{
    LoginRequest, LoginResponse, LogoutResponse, MeResponse, RegisterRequest,
};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use chrono::{DateTime, Utc};
use pawbill_auth::{AuthenticatedUser, JwtService, PasswordService};
use pawbill_core::models::{User, UserInfo, UserRole};
use pawbill_core::traits::{InvitationRepository, Repository, UserRepository};
use pawbill_core::AppError;
use pawbill_db::{PgInvitationRepository, PgUserRepository};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

fn auth_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build("token", token)
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(actix_web::cookie::time::Duration::seconds(max_age_secs))
        .finish()
}

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim().to_lowercase();
    let password = &req.password;

    debug!(email = %email, "Processing login request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let user = user_repo.find_by_email(&email).await?.ok_or_else(|| {
        info!(email = %email, "Login failed: user not found");
        AppError::InvalidCredentials
    })?;

    let password_valid = password_service
        .verify_password(password, &user.password_hash)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            AppError::Internal("Password verification failed".to_string())
        })?;

    if !password_valid {
        info!(email = %email, "Login failed: invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt_service.create_token_for_user(user.id, &user.email, user.role)?;
    let expires_in = jwt_service.expiration_secs();

    info!(email = %email, role = ?user.role, "Login successful");

    let user_info = UserInfo::from(&user);
    let response = LoginResponse::new(token.clone(), expires_in, user_info);

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token, expires_in))
        .json(ApiResponse::success(response)))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
#[instrument(skip(user))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    info!(user_id = %user.user_id, "User logged out");

    // Clear the token cookie
    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(LogoutResponse::default()))
}

/// Get current user info
///
/// GET /api/v1/auth/me
#[instrument(skip(pool, user))]
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    debug!(user_id = %user.user_id, "Getting current user info");

    // Get fresh user data from database
    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let db_user = user_repo
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user.user_id.to_string()))?;

    let token_expires_at = DateTime::<Utc>::from_timestamp(user.claims.exp, 0)
        .unwrap_or_else(Utc::now);

    let response = MeResponse {
        user: UserInfo::from(&db_user),
        token_expires_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Register with an invitation token
///
/// POST /api/v1/auth/register
///
/// Public endpoint. Valid only with an unused, unexpired invitation whose
/// email matches the request; the invitation is consumed on success and
/// the new account gets the owner role.
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn register(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Register validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim().to_lowercase();
    debug!(email = %email, "Processing registration request");

    let invitation_repo = PgInvitationRepository::new(pool.get_ref().clone());
    let invitation = invitation_repo
        .find_by_token(&req.token)
        .await?
        .ok_or_else(|| AppError::InvitationNotFound("unknown token".to_string()))?;

    if invitation.is_used() {
        warn!(email = %email, "Registration rejected: invitation already used");
        return Err(AppError::InvitationUsed);
    }
    if invitation.is_expired() {
        warn!(email = %email, "Registration rejected: invitation expired");
        return Err(AppError::InvitationExpired);
    }
    if invitation.email.to_lowercase() != email {
        warn!(email = %email, "Registration rejected: email does not match invitation");
        return Err(AppError::Validation(
            "Email does not match the invitation".to_string(),
        ));
    }

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    if user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::AlreadyExists(format!(
            "User {} already exists",
            email
        )));
    }

    let password_hash = password_service.hash_password(&req.password)?;

    let new_user = User {
        id: Uuid::new_v4(),
        email: email.clone(),
        password_hash,
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        phone: req.phone.clone(),
        role: UserRole::Owner,
        created_at: Utc::now(),
    };

    let created_user = user_repo.create(&new_user).await?;
    invitation_repo.mark_used(invitation.id).await?;

    info!(
        email = %created_user.email,
        id = %created_user.id,
        "User registered via invitation"
    );

    let token =
        jwt_service.create_token_for_user(created_user.id, &created_user.email, created_user.role)?;
    let expires_in = jwt_service.expiration_secs();

    let user_info = UserInfo::from(&created_user);
    let response = LoginResponse::new(token.clone(), expires_in, user_info);

    Ok(HttpResponse::Created()
        .cookie(auth_cookie(token, expires_in))
        .json(ApiResponse::with_message(
            response,
            "Account created successfully",
        )))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/register", web::post().to(register)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid_req = LoginRequest {
            email: "admin@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(valid_req.validate().is_ok());

        let invalid_req = LoginRequest {
            email: "".to_string(),
            password: "".to_string(),
        };
        assert!(invalid_req.validate().is_err());
    }
}
