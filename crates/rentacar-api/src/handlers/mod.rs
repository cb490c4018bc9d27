//! HTTP request handlers

pub mod admin;
pub mod auth;
pub mod car;
pub mod health;
pub mod reservation;
pub mod review;
pub mod stats;
pub mod user;

pub use admin::configure as configure_admin;
pub use auth::configure as configure_auth;
pub use car::configure as configure_cars;
pub use health::configure as configure_health;
pub use reservation::configure as configure_reservations;
pub use review::configure as configure_reviews;
pub use stats::configure as configure_stats;
pub use user::configure as configure_users;

use rentacar_core::models::ReservationStatus;
use rentacar_core::traits::{ReservationFilter, ReservationRepository};
use rentacar_core::AppError;
use rentacar_db::PgReservationRepository;
use sqlx::PgPool;

/// Number of pending or confirmed reservations matching `filter`
///
/// The filter's own status is ignored.
pub(crate) async fn count_live_reservations(
    pool: &PgPool,
    filter: ReservationFilter,
) -> Result<i64, AppError> {
    let repo = PgReservationRepository::new(pool.clone());
    let mut live = 0;

    for status in [ReservationStatus::Pending, ReservationStatus::Confirmed] {
        let filter = ReservationFilter {
            status: Some(status),
            ..filter.clone()
        };
        let (_, total) = repo.list_filtered(&filter, 1, 0).await?;
        live += total;
    }

    Ok(live)
}
