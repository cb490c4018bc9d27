//! Authentication handlers
//!
//! HTTP handlers for authentication endpoints.

use crate::dto::auth::{LoginRequest, LoginResponse, LogoutResponse, MeResponse, RegisterRequest};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use chrono::{DateTime, Utc};
use rentacar_auth::{AuthenticatedUser, JwtService, PasswordService, TOKEN_COOKIE};
use rentacar_core::models::{User, UserInfo};
use rentacar_core::traits::{Repository, UserRepository};
use rentacar_core::AppError;
use rentacar_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Register a customer account
///
/// POST /api/v1/auth/register
#[instrument(skip(pool, password_service, req))]
pub async fn register(
    pool: web::Data<PgPool>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Register validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim().to_lowercase();
    debug!(email = %email, "Processing registration request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    if user_repo.find_by_email(&email).await?.is_some() {
        info!(email = %email, "Registration refused: email already in use");
        return Err(AppError::AlreadyExists(format!(
            "An account with email {} already exists",
            email
        )));
    }

    let password_hash = password_service.hash_new_password(&req.password)?;
    let new_user = User::new(
        req.name.trim().to_string(),
        email,
        password_hash,
        req.phone.clone(),
    );

    let created_user = user_repo.create(&new_user).await?;

    info!(
        user_id = %created_user.id,
        email = %created_user.email,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        UserInfo::from(created_user),
        "User created successfully",
    )))
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

    let email = req.email.trim();
    debug!(email = %email, "Processing login request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let user = user_repo.find_by_email(email).await?.ok_or_else(|| {
        info!(email = %email, "Login failed: user not found");
        AppError::InvalidCredentials
    })?;

    password_service.verify_login(&req.password, &user.password_hash)?;

    let token = jwt_service.create_token_for_user(user.id, &user.email, user.role)?;
    let expires_in = jwt_service.expiration_secs();

    info!(user_id = %user.id, role = %user.role, "Login successful");

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    let response = LoginResponse::new(token, expires_in, UserInfo::from(&user));

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(response)))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
#[instrument(skip(user))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    info!(user_id = %user.user_id(), "User logged out");

    let cookie = Cookie::build(TOKEN_COOKIE, "")
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
    debug!(user_id = %user.user_id(), "Getting current user info");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let db_user = user_repo
        .find_by_id(user.user_id())
        .await?
        .ok_or_else(|| AppError::UserNotFound(user.user_id().to_string()))?;

    let token_expires_at =
        DateTime::<Utc>::from_timestamp(user.claims.exp, 0).unwrap_or_else(Utc::now);

    let response = MeResponse {
        user: UserInfo::from(db_user),
        token_expires_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}
