//! Reservation/car reconciliation sweep
//!
//! Nothing else moves a reservation from confirmed to completed. Each pass
//! completes every confirmed reservation whose end date has passed and frees
//! its car unless another reservation on that car covers the current instant.

use chrono::{DateTime, Utc};
use rentacar_core::{
    models::{CarStatus, Reservation, ReservationStatus},
    traits::{CarRepository, ReservationRepository},
    AppError, AppResult,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::car_locks::CarLocks;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Expired confirmed reservations found
    pub examined: usize,
    /// Reservations moved to completed
    pub completed: usize,
    /// Cars set back to available
    pub cars_released: usize,
    /// Reservations whose processing failed; retried on the next pass
    pub failed: usize,
}

/// Reconciliation job
pub struct ReconciliationJob<C: CarRepository, R: ReservationRepository> {
    car_repo: Arc<C>,
    reservation_repo: Arc<R>,
    locks: Arc<CarLocks>,
}

impl<C: CarRepository, R: ReservationRepository> ReconciliationJob<C, R> {
    pub fn new(car_repo: Arc<C>, reservation_repo: Arc<R>, locks: Arc<CarLocks>) -> Self {
        Self {
            car_repo,
            reservation_repo,
            locks,
        }
    }

    /// Run one pass against the current time
    pub async fn run(&self) -> AppResult<ReconciliationReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass as of `now`
    ///
    /// Only a failure to list candidates is returned as an error. A failure on
    /// a single reservation is logged and counted, and the pass moves on.
    #[instrument(skip(self))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> AppResult<ReconciliationReport> {
        let expired = self
            .reservation_repo
            .find_expired_confirmed(now)
            .await
            .map_err(|e| {
                error!(error = %e, "Reconciliation could not list expired reservations");
                e
            })?;

        let mut report = ReconciliationReport {
            examined: expired.len(),
            ..Default::default()
        };

        for reservation in &expired {
            match self.complete(reservation, now).await {
                Ok(released) => {
                    report.completed += 1;
                    if released {
                        report.cars_released += 1;
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        reservation_id = %reservation.id,
                        car_id = %reservation.car_id,
                        error = %e,
                        "Failed to reconcile reservation"
                    );
                }
            }
        }

        self.locks.prune();
        debug!(tracked = self.locks.tracked(), "Car locks pruned");

        if report.examined > 0 {
            info!(
                examined = report.examined,
                completed = report.completed,
                cars_released = report.cars_released,
                failed = report.failed,
                "Reconciliation pass finished"
            );
        } else {
            debug!("Reconciliation pass found nothing to do");
        }

        Ok(report)
    }

    /// Complete one reservation; returns true when its car was released
    async fn complete(&self, reservation: &Reservation, now: DateTime<Utc>) -> AppResult<bool> {
        let _guard = self.locks.acquire(reservation.car_id).await;
        let mut released = false;

        match self.car_repo.find_by_id(reservation.car_id).await? {
            Some(car) => {
                // Any status counts as covering, not just confirmed
                let covering = self
                    .reservation_repo
                    .find_covering(car.id, now, reservation.id)
                    .await?;

                if !covering.is_empty() {
                    debug!(
                        car_id = %car.id,
                        covering = covering.len(),
                        "Car still in use, keeping status"
                    );
                } else if car.status != CarStatus::Available {
                    if !self
                        .car_repo
                        .update_status(car.id, CarStatus::Available)
                        .await?
                    {
                        return Err(AppError::CarNotFound(car.id.to_string()));
                    }
                    released = true;
                    info!(car_id = %car.id, previous = %car.status, "Car released");
                }
            }
            None => warn!(
                reservation_id = %reservation.id,
                car_id = %reservation.car_id,
                "Car missing, completing reservation without car update"
            ),
        }

        if !self
            .reservation_repo
            .update_status(reservation.id, ReservationStatus::Completed)
            .await?
        {
            return Err(AppError::ReservationNotFound(reservation.id.to_string()));
        }

        debug!(reservation_id = %reservation.id, "Reservation completed");
        Ok(released)
    }
}
