//! Authentication and authorization for RentACar
//!
//! This crate provides JWT-based authentication, password hashing with Argon2,
//! and Actix-web extractors for customer and administrator access.
//!
//! # Examples
//!
//! ## Creating a JWT token
//!
//! ```no_run
//! use rentacar_auth::JwtService;
//! use rentacar_core::models::UserRole;
//! use uuid::Uuid;
//!
//! let jwt_service = JwtService::new("your-secret-key", 3600);
//! let token = jwt_service.create_token_for_user(Uuid::new_v4(), "ana@example.com", UserRole::Admin)?;
//! # Ok::<(), rentacar_core::error::AppError>(())
//! ```
//!
//! ## Using extractors in Actix-web
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use rentacar_auth::middleware::{AdminUser, AuthenticatedUser};
//!
//! async fn protected_route(user: AuthenticatedUser) -> HttpResponse {
//!     HttpResponse::Ok().json(serde_json::json!({ "user_id": user.user_id() }))
//! }
//!
//! async fn admin_route(_admin: AdminUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser, TOKEN_COOKIE};
pub use password::PasswordService;
