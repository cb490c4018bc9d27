//! API layer for RentACar
//!
//! HTTP handlers for accounts, the car fleet, reservations and their
//! approval workflow, revenue statistics and reviews.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod dto;
pub mod handlers;

use actix_web::web;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_admin, configure_auth, configure_cars, configure_health, configure_reservations,
    configure_reviews, configure_stats, configure_users,
};

/// Mount every route under `/api/v1`
///
/// Expects `PgPool`, `Arc<JwtService>`, `Arc<PasswordService>` and
/// `Arc<CarLocks>` as app data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(configure_health)
            .configure(configure_auth)
            .configure(configure_users)
            .configure(configure_cars)
            .configure(configure_reviews)
            .configure(configure_reservations)
            .configure(configure_stats)
            .configure(configure_admin),
    );
}
