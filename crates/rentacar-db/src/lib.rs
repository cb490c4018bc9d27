//! RentACar Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the RentACar backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Embedded schema migrations
//! - Repository implementations for cars, reservations, statistics, users and reviews

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use rentacar_core::{AppError, AppResult};
pub use sqlx::PgPool;
