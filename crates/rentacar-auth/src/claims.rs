//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{Duration, Utc};
use rentacar_core::models::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
///
/// Identifies the user by id; email and role ride along so handlers do not
/// need a lookup for authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,

    /// Email at the time the token was issued
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims; expiration is filled in by `JwtService`
    ///
    /// # Examples
    ///
    /// ```
    /// use rentacar_auth::Claims;
    /// use rentacar_core::models::UserRole;
    /// use uuid::Uuid;
    ///
    /// let id = Uuid::new_v4();
    /// let claims = Claims::new(id, "ana@example.com", UserRole::Admin);
    /// assert_eq!(claims.sub, id);
    /// assert_eq!(claims.role, UserRole::Admin);
    /// ```
    pub fn new(user_id: Uuid, email: &str, role: UserRole) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: 0,
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        user_id: Uuid,
        email: &str,
        role: UserRole,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: user_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
