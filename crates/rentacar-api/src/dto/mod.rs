//! Data Transfer Objects (DTOs) for API requests and responses

pub mod auth;
pub mod car;
pub mod common;
pub mod reservation;
pub mod review;
pub mod stats;
pub mod user;

pub use auth::*;
pub use car::*;
pub use common::*;
pub use reservation::*;
pub use review::*;
pub use stats::*;
pub use user::*;
