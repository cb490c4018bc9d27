//! Password hashing and verification using Argon2
//!
//! Customer passwords are stored as Argon2id PHC strings; the plaintext never
//! leaves this module.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use rentacar_core::error::AppError;
use tracing::{debug, error, warn};

/// Shortest password accepted at registration or password change
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password hashing service using Argon2
#[derive(Debug, Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Create a new password service with default Argon2 parameters
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a password using Argon2
    ///
    /// # Errors
    ///
    /// Returns `AppError::PasswordHash` if hashing fails
    ///
    /// # Examples
    ///
    /// ```
    /// use rentacar_auth::PasswordService;
    ///
    /// let password_service = PasswordService::new();
    /// let hash = password_service.hash_password("my_secure_password")?;
    /// assert!(hash.starts_with("$argon2"));
    /// # Ok::<(), rentacar_core::error::AppError>(())
    /// ```
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::PasswordHash(format!("Password hashing failed: {}", e))
            })?;

        Ok(password_hash.to_string())
    }

    /// Check the length rule, then hash
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the password is too short
    pub fn hash_new_password(&self, password: &str) -> Result<String, AppError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        self.hash_password(password)
    }

    /// Verify a password against a hash
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// unreadable.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "Failed to parse password hash");
            AppError::PasswordHash(format!("Invalid password hash format: {}", e))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(_) => {
                debug!("Password verification successful");
                Ok(true)
            }
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Password verification error");
                Err(AppError::PasswordHash(format!(
                    "Password verification failed: {}",
                    e
                )))
            }
        }
    }

    /// Login check: any mismatch or unreadable hash becomes `InvalidCredentials`
    pub fn verify_login(&self, password: &str, hash: &str) -> Result<(), AppError> {
        match self.verify_password(password, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::InvalidCredentials),
            Err(e) => {
                warn!(error = %e, "Stored password hash rejected during login");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}
