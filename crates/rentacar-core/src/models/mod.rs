//! Domain models for RentACar
//!
//! This module contains all the core domain models used throughout the application.

pub mod car;
pub mod reservation;
pub mod review;
pub mod statistics;
pub mod user;

pub use car::{Car, CarSize, CarStatus, FuelType, Transmission};
pub use reservation::{Reservation, ReservationStatus};
pub use review::{average_rating, Review};
pub use statistics::{DailyRevenue, PaymentStatus, Statistics};
pub use user::{User, UserInfo, UserRole};
