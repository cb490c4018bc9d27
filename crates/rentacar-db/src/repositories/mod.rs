//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in rentacar-core, using sqlx for PostgreSQL access.

pub mod car_repo;
pub mod reservation_repo;
pub mod review_repo;
pub mod statistics_repo;
pub mod user_repo;

pub use car_repo::PgCarRepository;
pub use reservation_repo::PgReservationRepository;
pub use review_repo::PgReviewRepository;
pub use statistics_repo::PgStatisticsRepository;
pub use user_repo::PgUserRepository;
