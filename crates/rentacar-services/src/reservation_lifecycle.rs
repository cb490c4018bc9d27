//! Reservation lifecycle service
//!
//! Keeps a reservation, its revenue statistics row and its car consistent
//! through the admin workflow:
//! - Create a pending reservation together with a pending statistics row
//! - Approve: confirm the reservation and its statistics, reserve the car
//! - Reject: remove the reservation and its statistics
//!
//! The store has no cross-record transaction here. Every multi-record step
//! that fails half way undoes what it already wrote before returning.

use chrono::{DateTime, Utc};
use rentacar_core::{
    models::{CarStatus, PaymentStatus, Reservation, ReservationStatus, Statistics},
    traits::{CarRepository, ReservationRepository, StatisticsRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::car_locks::CarLocks;

/// Reservation lifecycle manager
pub struct ReservationLifecycle<C, R, S>
where
    C: CarRepository,
    R: ReservationRepository,
    S: StatisticsRepository,
{
    car_repo: Arc<C>,
    reservation_repo: Arc<R>,
    statistics_repo: Arc<S>,
    locks: Arc<CarLocks>,
}

impl<C, R, S> ReservationLifecycle<C, R, S>
where
    C: CarRepository,
    R: ReservationRepository,
    S: StatisticsRepository,
{
    /// Create a new lifecycle manager
    pub fn new(
        car_repo: Arc<C>,
        reservation_repo: Arc<R>,
        statistics_repo: Arc<S>,
        locks: Arc<CarLocks>,
    ) -> Self {
        Self {
            car_repo,
            reservation_repo,
            statistics_repo,
            locks,
        }
    }

    /// Create a pending reservation and its statistics row
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or inverted interval, a negative cost, or
    ///   when either record cannot be stored
    /// - `CarNotFound` if the car does not exist
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        user_id: Uuid,
        car_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        total_cost: Decimal,
    ) -> AppResult<Reservation> {
        if start_date >= end_date {
            return Err(AppError::Validation(
                "start_date must be before end_date".to_string(),
            ));
        }
        if total_cost < Decimal::ZERO {
            return Err(AppError::Validation(
                "total_cost must not be negative".to_string(),
            ));
        }

        self.car_repo
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::CarNotFound(car_id.to_string()))?;

        let reservation = Reservation::new(user_id, car_id, start_date, end_date, total_cost);
        let reservation = self
            .reservation_repo
            .create(&reservation)
            .await
            .map_err(|e| {
                error!(car_id = %car_id, error = %e, "Failed to store reservation");
                AppError::Validation(format!("Reservation could not be saved: {}", e))
            })?;

        let statistics = Statistics::for_reservation(&reservation);
        if let Err(e) = self.statistics_repo.create(&statistics).await {
            error!(
                reservation_id = %reservation.id,
                error = %e,
                "Failed to store statistics, removing reservation"
            );
            if let Err(undo) = self.reservation_repo.delete(reservation.id).await {
                error!(
                    reservation_id = %reservation.id,
                    error = %undo,
                    "Reservation left without statistics row"
                );
            }
            return Err(AppError::Validation(format!(
                "Reservation statistics could not be saved: {}",
                e
            )));
        }

        info!(
            reservation_id = %reservation.id,
            car_id = %car_id,
            user_id = %user_id,
            total_cost = %total_cost,
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Create a reservation priced from the car's daily rate
    pub async fn create_quoted(
        &self,
        user_id: Uuid,
        car_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let car = self
            .car_repo
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::CarNotFound(car_id.to_string()))?;

        let total_cost = car.quote(start_date, end_date);
        debug!(car_id = %car_id, total_cost = %total_cost, "Quoted reservation");

        self.create(user_id, car_id, start_date, end_date, total_cost)
            .await
    }

    /// Approve a pending reservation and reserve its car
    ///
    /// # Errors
    ///
    /// - `ReservationNotFound` / `CarNotFound` when a record is missing
    /// - `InvalidState` when the reservation is not pending or the car is not
    ///   available; nothing is written in that case
    #[instrument(skip(self))]
    pub async fn approve(&self, reservation_id: Uuid) -> AppResult<Reservation> {
        let car_id = self.load_pending(reservation_id).await?.car_id;

        let _guard = self.locks.acquire(car_id).await;

        // Re-read under the lock; a concurrent approve or reject may have won
        let mut reservation = self.load_pending(reservation_id).await?;

        let car = self
            .car_repo
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::CarNotFound(car_id.to_string()))?;

        if car.status != CarStatus::Available {
            warn!(
                reservation_id = %reservation_id,
                car_id = %car_id,
                car_status = %car.status,
                "Approve refused, car not available"
            );
            return Err(AppError::InvalidState(format!(
                "Car {} is {}, not available",
                car_id, car.status
            )));
        }

        let statistics = self
            .statistics_repo
            .find_by_reservation(reservation_id)
            .await?;

        if !self
            .reservation_repo
            .update_status(reservation_id, ReservationStatus::Confirmed)
            .await?
        {
            return Err(AppError::ReservationNotFound(reservation_id.to_string()));
        }

        if let Err(e) = self
            .confirm_dependents(reservation_id, car_id, statistics.as_ref())
            .await
        {
            error!(
                reservation_id = %reservation_id,
                error = %e,
                "Approve failed after confirming reservation, reverting"
            );
            self.revert_approval(reservation_id, statistics.as_ref())
                .await;
            return Err(e);
        }

        info!(
            reservation_id = %reservation_id,
            car_id = %car_id,
            "Reservation approved, car reserved"
        );

        reservation.status = ReservationStatus::Confirmed;
        reservation.updated_at = Utc::now();
        Ok(reservation)
    }

    /// Reject a pending reservation, removing it and its statistics row
    ///
    /// The cancelled state is never stored; it is emitted as an audit event
    /// just before the delete.
    ///
    /// # Errors
    ///
    /// - `ReservationNotFound` when missing or not pending
    /// - `StatisticsNotFound` when the statistics row is missing; nothing is
    ///   deleted in that case
    #[instrument(skip(self))]
    pub async fn reject(&self, reservation_id: Uuid) -> AppResult<Reservation> {
        let car_id = self.find_rejectable(reservation_id).await?.car_id;

        let _guard = self.locks.acquire(car_id).await;

        let mut reservation = self.find_rejectable(reservation_id).await?;

        let statistics = self
            .statistics_repo
            .find_by_reservation(reservation_id)
            .await?
            .ok_or_else(|| {
                error!(
                    reservation_id = %reservation_id,
                    "Pending reservation has no statistics row"
                );
                AppError::StatisticsNotFound(reservation_id.to_string())
            })?;

        info!(
            target: "audit",
            reservation_id = %reservation_id,
            user_id = %reservation.user_id,
            car_id = %car_id,
            from = %ReservationStatus::Pending,
            to = %ReservationStatus::Cancelled,
            "Reservation status change"
        );

        if !self.reservation_repo.delete(reservation_id).await? {
            return Err(AppError::ReservationNotFound(reservation_id.to_string()));
        }

        if let Err(e) = self.statistics_repo.delete(statistics.id).await {
            error!(
                reservation_id = %reservation_id,
                error = %e,
                "Failed to delete statistics, restoring reservation"
            );
            if let Err(undo) = self.reservation_repo.create(&reservation).await {
                error!(
                    reservation_id = %reservation_id,
                    error = %undo,
                    "Statistics row left without reservation"
                );
            }
            return Err(e);
        }

        info!(reservation_id = %reservation_id, "Reservation rejected and removed");

        reservation.status = ReservationStatus::Cancelled;
        Ok(reservation)
    }

    async fn load_pending(&self, reservation_id: Uuid) -> AppResult<Reservation> {
        let reservation = self
            .reservation_repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::ReservationNotFound(reservation_id.to_string()))?;

        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Reservation {} is {}, not pending",
                reservation_id, reservation.status
            )));
        }

        Ok(reservation)
    }

    /// Only pending reservations can be rejected; anything else reads as absent
    async fn find_rejectable(&self, reservation_id: Uuid) -> AppResult<Reservation> {
        self.reservation_repo
            .find_by_id(reservation_id)
            .await?
            .filter(|r| r.status == ReservationStatus::Pending)
            .ok_or_else(|| AppError::ReservationNotFound(reservation_id.to_string()))
    }

    async fn confirm_dependents(
        &self,
        reservation_id: Uuid,
        car_id: Uuid,
        statistics: Option<&Statistics>,
    ) -> AppResult<()> {
        match statistics {
            Some(stats) => {
                self.statistics_repo
                    .update_payment_status(stats.id, PaymentStatus::Confirmed)
                    .await?;
            }
            None => warn!(
                reservation_id = %reservation_id,
                "Data integrity: no statistics row for approved reservation"
            ),
        }

        if !self
            .car_repo
            .update_status(car_id, CarStatus::Reserved)
            .await?
        {
            return Err(AppError::CarNotFound(car_id.to_string()));
        }

        Ok(())
    }

    async fn revert_approval(&self, reservation_id: Uuid, statistics: Option<&Statistics>) {
        if let Err(e) = self
            .reservation_repo
            .update_status(reservation_id, ReservationStatus::Pending)
            .await
        {
            error!(reservation_id = %reservation_id, error = %e, "Could not revert reservation to pending");
        }

        if let Some(stats) = statistics {
            if let Err(e) = self
                .statistics_repo
                .update_payment_status(stats.id, PaymentStatus::Pending)
                .await
            {
                error!(statistics_id = %stats.id, error = %e, "Could not revert statistics to pending");
            }
        }
    }
}
