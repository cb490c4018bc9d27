//! Actix-web request extractors for authenticated users

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use rentacar_core::error::AppError;
use rentacar_core::models::UserRole;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Extract JWT token from request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    req.cookie(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Authenticated user extractor
///
/// Extracts and validates the JWT from the request. Fails with 401 when the
/// token is missing, malformed, or expired.
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use rentacar_auth::middleware::AuthenticatedUser;
///
/// async fn protected_handler(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().json(serde_json::json!({
///         "user_id": user.user_id(),
///         "role": user.role
///     }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Email of the authenticated user
    pub email: String,

    /// Role of the authenticated user
    pub role: String,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Uuid {
        self.claims.sub
    }

    /// Get the user's role as a UserRole enum
    pub fn user_role(&self) -> UserRole {
        self.claims.role
    }

    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }

    /// True when the caller is `user_id` or an administrator
    pub fn can_access(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.user_id() == user_id
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email.clone(),
            role: claims.role.to_string(),
            claims,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
            Some(service) => service.get_ref().clone(),
            None => {
                warn!("JwtService not found in app data");
                return ready(Err(AppError::Unauthorized(
                    "Authentication service not configured".to_string(),
                )
                .into()));
            }
        };

        let token = match extract_token_from_request(req) {
            Some(t) => t,
            None => {
                debug!("No authentication token found in request");
                return ready(Err(AppError::Unauthorized(
                    "No authentication token provided".to_string(),
                )
                .into()));
            }
        };

        match jwt_service.validate_token(&token) {
            Ok(claims) => {
                debug!(
                    user_id = %claims.sub,
                    role = ?claims.role,
                    "User authenticated successfully"
                );
                ready(Ok(AuthenticatedUser::from(claims)))
            }
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                ready(Err(e.into()))
            }
        }
    }
}

/// Admin user extractor
///
/// Requires the admin role; other authenticated users get 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl std::ops::Deref for AdminUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_user = match AuthenticatedUser::from_request(req, payload).into_inner() {
            Ok(user) => user,
            Err(e) => return ready(Err(e)),
        };

        if !auth_user.is_admin() {
            warn!(
                user_id = %auth_user.user_id(),
                role = %auth_user.role,
                "User attempted admin access without privileges"
            );
            return ready(Err(AppError::Forbidden.into()));
        }

        debug!(user_id = %auth_user.user_id(), "Admin access granted");

        ready(Ok(AdminUser(auth_user)))
    }
}
