//! User management handlers
//!
//! Administrators manage every account; customers only their own.

use crate::dto::user::UserUpdateRequest;
use crate::dto::{ApiResponse, PaginationParams};
use crate::handlers::count_live_reservations;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use rentacar_auth::{AdminUser, AuthenticatedUser, PasswordService};
use rentacar_core::models::UserInfo;
use rentacar_core::traits::{Repository, ReservationFilter};
use rentacar_core::AppError;
use rentacar_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Refuse access to another user's account unless the caller is an admin
fn ensure_can_access(user: &AuthenticatedUser, user_id: Uuid) -> Result<(), AppError> {
    if user.can_access(user_id) {
        return Ok(());
    }

    warn!(
        caller = %user.user_id(),
        target = %user_id,
        "Access to another user's account refused"
    );
    Err(AppError::Forbidden)
}

/// List users with pagination
///
/// GET /api/v1/users
#[instrument(skip(pool, _admin))]
pub async fn list_users(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(page = query.page, per_page = query.per_page, "Listing users");

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let users = repo.find_all(query.limit(), query.offset()).await?;
    let total = repo.count().await?;

    let response_data: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();

    Ok(HttpResponse::Ok().json(query.paginate(response_data, total)))
}

/// Get a single user
///
/// GET /api/v1/users/{id}
#[instrument(skip(pool, user))]
pub async fn get_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    ensure_can_access(&user, user_id)?;

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let found = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(found))))
}

/// Update name, phone or password
///
/// PUT /api/v1/users/{id}
#[instrument(skip(pool, password_service, user, req))]
pub async fn update_user(
    pool: web::Data<PgPool>,
    password_service: web::Data<Arc<PasswordService>>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
    req: web::Json<UserUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("User update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let user_id = path.into_inner();
    ensure_can_access(&user, user_id)?;

    if req.is_empty() {
        return Err(AppError::InvalidInput("No fields to update".to_string()));
    }

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let mut existing = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    if let Some(name) = &req.name {
        existing.name = name.trim().to_string();
    }
    if let Some(phone) = &req.phone {
        existing.phone = Some(phone.trim().to_string()).filter(|p| !p.is_empty());
    }
    let password_changed = match &req.password {
        Some(password) => {
            existing.password_hash = password_service.hash_new_password(password)?;
            true
        }
        None => false,
    };
    existing.updated_at = Utc::now();

    let updated = repo.update(&existing).await?;

    info!(
        user_id = %updated.id,
        by = %user.user_id(),
        password_changed,
        "User updated successfully"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        UserInfo::from(updated),
        "User updated successfully",
    )))
}

/// Delete a user and, through the schema, their reservations and reviews
///
/// Refused while the user holds a pending or confirmed reservation, so no
/// live reservation loses its statistics row.
///
/// DELETE /api/v1/users/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if user_id == admin.user_id() {
        return Err(AppError::InvalidInput(
            "Administrators cannot delete their own account".to_string(),
        ));
    }

    let filter = ReservationFilter {
        user_id: Some(user_id),
        ..Default::default()
    };
    let live = count_live_reservations(pool.get_ref(), filter).await?;
    if live > 0 {
        return Err(AppError::Conflict(format!(
            "User {} has {} live reservation(s)",
            user_id, live
        )));
    }

    let repo = PgUserRepository::new(pool.get_ref().clone());
    if !repo.delete(user_id).await? {
        return Err(AppError::UserNotFound(user_id.to_string()));
    }

    info!(user_id = %user_id, admin = %admin.user_id(), "User deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
