//! Dog management handlers
//!
//! Admins manage all dogs; owners get a read-only view scoped to their
//! own animals.

use crate::dto::dog::{CreateDogRequest, DogQuery, UpdateDogRequest};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use pawbill_auth::{AdminUser, AuthenticatedUser};
use pawbill_core::models::Dog;
use pawbill_core::traits::{DogRepository, Repository};
use pawbill_core::AppError;
use pawbill_db::PgDogRepository;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// List dogs
///
/// GET /api/v1/dogs
///
/// Owners always see only their own dogs; admins see all and may filter
/// by owner_id.
#[instrument(skip(pool, user))]
pub async fn list_dogs(
    pool: web::Data<PgPool>,
    query: web::Query<DogQuery>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let owner_filter = if user.is_admin() {
        query.owner_id
    } else {
        Some(user.user_id)
    };

    debug!(owner_filter = ?owner_filter, "Listing dogs");

    let repo = PgDogRepository::new(pool.get_ref().clone());
    let dogs = repo.list_filtered(owner_filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(dogs)))
}

/// Get one dog
///
/// GET /api/v1/dogs/{id}
#[instrument(skip(pool, user))]
pub async fn get_dog(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let dog_id = path.into_inner();

    let repo = PgDogRepository::new(pool.get_ref().clone());
    let dog = repo
        .find_by_id(dog_id)
        .await?
        .ok_or_else(|| AppError::DogNotFound(dog_id.to_string()))?;

    if !user.is_admin() && !dog.is_owned_by(user.user_id) {
        warn!(
            user_id = %user.user_id,
            dog_id = %dog_id,
            "User attempted to read a dog they do not own"
        );
        return Err(AppError::Forbidden);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(dog)))
}

/// Create a dog
///
/// POST /api/v1/dogs
#[instrument(skip(pool, admin, req))]
pub async fn create_dog(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CreateDogRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Dog creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(name = %req.name, admin = %admin.user_id, "Creating dog");

    let dog = Dog {
        id: Uuid::new_v4(),
        name: req.name.clone(),
        breed: req.breed.clone(),
        age: req.age,
        weight: req.weight,
        owner_id: req.owner_id,
        owner: None,
        medical_notes: req.medical_notes.clone(),
        emergency_contact: req.emergency_contact.clone(),
        photo_url: req.photo_url.clone(),
        created_at: Utc::now(),
    };

    let repo = PgDogRepository::new(pool.get_ref().clone());
    let created = repo.create(&dog).await?;

    info!(dog_id = %created.id, name = %created.name, "Dog created");
    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// Update a dog
///
/// PATCH /api/v1/dogs/{id}
#[instrument(skip(pool, _admin, req))]
pub async fn update_dog(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    _admin: AdminUser,
    req: web::Json<UpdateDogRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Dog update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let dog_id = path.into_inner();

    let repo = PgDogRepository::new(pool.get_ref().clone());
    let mut dog = repo
        .find_by_id(dog_id)
        .await?
        .ok_or_else(|| AppError::DogNotFound(dog_id.to_string()))?;

    if let Some(name) = &req.name {
        dog.name = name.clone();
    }
    if let Some(breed) = &req.breed {
        dog.breed = Some(breed.clone());
    }
    if let Some(age) = req.age {
        dog.age = Some(age);
    }
    if let Some(weight) = req.weight {
        dog.weight = Some(weight);
    }
    if let Some(owner_id) = req.owner_id {
        dog.owner_id = owner_id;
    }
    if let Some(medical_notes) = &req.medical_notes {
        dog.medical_notes = Some(medical_notes.clone());
    }
    if let Some(emergency_contact) = &req.emergency_contact {
        dog.emergency_contact = Some(emergency_contact.clone());
    }
    if let Some(photo_url) = &req.photo_url {
        dog.photo_url = Some(photo_url.clone());
    }

    let updated = repo.update(&dog).await?;

    info!(dog_id = %updated.id, "Dog updated");
    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Delete a dog
///
/// DELETE /api/v1/dogs/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_dog(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let dog_id = path.into_inner();
    debug!(dog_id = %dog_id, admin = %admin.user_id, "Deleting dog");

    let repo = PgDogRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(dog_id).await?;

    if deleted {
        info!(dog_id = %dog_id, admin = %admin.user_id, "Dog deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::DogNotFound(dog_id.to_string()))
    }
}

/// Configure dog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dogs")
            .route("", web::get().to(list_dogs))
            .route("", web::post().to(create_dog))
            .route("/{id}", web::get().to(get_dog))
            .route("/{id}", web::patch().to(update_dog))
            .route("/{id}", web::delete().to(delete_dog)),
    );
}
