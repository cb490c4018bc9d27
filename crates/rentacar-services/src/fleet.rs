//! Admin edits to fleet cars
//!
//! Details and status are written separately. The row update never carries
//! a status, so an edit based on an older read cannot undo an approval or a
//! release. A status change goes through `update_status` under the car lock.

use rentacar_core::{
    models::{Car, CarStatus},
    traits::CarRepository,
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::car_locks::CarLocks;

/// Fleet manager
pub struct FleetManager<C: CarRepository> {
    car_repo: Arc<C>,
    locks: Arc<CarLocks>,
}

impl<C: CarRepository> FleetManager<C> {
    pub fn new(car_repo: Arc<C>, locks: Arc<CarLocks>) -> Self {
        Self { car_repo, locks }
    }

    /// Edit a car's details and optionally set its status
    ///
    /// `edit` runs on a copy loaded under the car lock. Only `available` and
    /// `maintenance` can be set here; `reserved` belongs to approval.
    ///
    /// # Errors
    ///
    /// - `Validation` for a reservation-driven status or a failed `edit`
    /// - `CarNotFound` if the car does not exist
    #[instrument(skip(self, edit))]
    pub async fn update_car<F>(
        &self,
        car_id: Uuid,
        status: Option<CarStatus>,
        edit: F,
    ) -> AppResult<Car>
    where
        F: FnOnce(&mut Car) -> AppResult<()> + Send,
    {
        if let Some(status) = status.filter(CarStatus::is_booked) {
            return Err(AppError::Validation(format!(
                "Car status {} is set by reservations only",
                status
            )));
        }

        let _guard = self.locks.acquire(car_id).await;

        let mut car = self
            .car_repo
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::CarNotFound(car_id.to_string()))?;

        edit(&mut car)?;
        let mut updated = self.car_repo.update(&car).await?;

        if let Some(status) = status.filter(|s| *s != updated.status) {
            if !self.car_repo.update_status(car_id, status).await? {
                return Err(AppError::CarNotFound(car_id.to_string()));
            }
            info!(
                car_id = %car_id,
                from = %updated.status,
                to = %status,
                "Car status set manually"
            );
            updated.status = status;
        }

        Ok(updated)
    }
}
