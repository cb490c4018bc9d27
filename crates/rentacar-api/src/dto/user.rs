//! User management DTOs

use serde::Deserialize;
use validator::Validate;

/// Profile update request
///
/// Absent fields are left unchanged. Role changes are not exposed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    /// New password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl UserUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.password.is_none()
    }
}
