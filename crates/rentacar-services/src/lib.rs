//! Business logic services for RentACar
//!
//! The reservation workflow and the housekeeping sweep that keep
//! reservations, revenue statistics and car availability consistent.
//!
//! # Services
//!
//! - `ReservationLifecycle` - create, approve and reject reservations
//! - `ReconciliationJob` - complete expired reservations and free their cars
//! - `FleetManager` - admin edits to a car's details and status
//! - `CarLocks` - per-car mutual exclusion shared by all three
//! - `start_scheduler` - cron trigger for the reconciliation job
//!
//! Services are generic over the repository traits of `rentacar-core`; the
//! `Pg*` aliases bind them to the PostgreSQL repositories.

pub mod car_locks;
pub mod fleet;
pub mod reconciliation;
pub mod reservation_lifecycle;
pub mod scheduler;

pub use car_locks::CarLocks;
pub use fleet::FleetManager;
pub use reconciliation::{ReconciliationJob, ReconciliationReport};
pub use reservation_lifecycle::ReservationLifecycle;
pub use scheduler::{start_scheduler, DEFAULT_SCHEDULE};

use rentacar_db::{PgCarRepository, PgReservationRepository, PgStatisticsRepository};
use rentacar_db::PgPool;
use std::sync::Arc;

/// Lifecycle manager over PostgreSQL
pub type PgReservationLifecycle =
    ReservationLifecycle<PgCarRepository, PgReservationRepository, PgStatisticsRepository>;

/// Fleet manager over PostgreSQL
pub type PgFleetManager = FleetManager<PgCarRepository>;

/// Reconciliation job over PostgreSQL
pub type PgReconciliationJob = ReconciliationJob<PgCarRepository, PgReservationRepository>;

impl PgReservationLifecycle {
    pub fn from_pool(pool: PgPool, locks: Arc<CarLocks>) -> Self {
        Self::new(
            Arc::new(PgCarRepository::new(pool.clone())),
            Arc::new(PgReservationRepository::new(pool.clone())),
            Arc::new(PgStatisticsRepository::new(pool)),
            locks,
        )
    }
}

impl PgReconciliationJob {
    pub fn from_pool(pool: PgPool, locks: Arc<CarLocks>) -> Self {
        Self::new(
            Arc::new(PgCarRepository::new(pool.clone())),
            Arc::new(PgReservationRepository::new(pool)),
            locks,
        )
    }
}

impl PgFleetManager {
    pub fn from_pool(pool: PgPool, locks: Arc<CarLocks>) -> Self {
        Self::new(Arc::new(PgCarRepository::new(pool)), locks)
    }
}
