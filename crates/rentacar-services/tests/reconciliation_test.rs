//! Reconciliation sweep tests against the in-memory store

mod common;

use common::{day, services, services_with_fleet, MemoryStore};
use rentacar_core::models::{CarStatus, PaymentStatus, ReservationStatus};
use rentacar_core::{AppError, AppResult};
use rentacar_services::{CarLocks, ReconciliationReport};
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_full_rental_scenario() {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Available, dec!(50));
    let (lifecycle, reconciliation) = services(&store);

    let reservation = lifecycle
        .create(Uuid::new_v4(), car.id, day(2024, 1, 1), day(2024, 1, 5), dec!(200))
        .await
        .unwrap();
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(store.car(car.id).unwrap().status, CarStatus::Available);

    lifecycle.approve(reservation.id).await.unwrap();
    assert_eq!(store.car(car.id).unwrap().status, CarStatus::Reserved);

    let report = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(
        report,
        ReconciliationReport {
            examined: 1,
            completed: 1,
            cars_released: 1,
            failed: 0,
        }
    );
    assert_eq!(
        store.reservation(reservation.id).unwrap().status,
        ReservationStatus::Completed
    );
    assert_eq!(store.car(car.id).unwrap().status, CarStatus::Available);
    // Revenue recognition stays at confirmed after completion
    assert_eq!(
        store.statistics_for(reservation.id)[0].payment_status,
        PaymentStatus::Confirmed
    );
}

#[tokio::test]
async fn test_every_expired_confirmed_reservation_completes() {
    let store = MemoryStore::new();
    let (_, reconciliation) = services(&store);
    let mut expired = Vec::new();
    for _ in 0..3 {
        let car = store.add_car(CarStatus::Rented, dec!(30));
        expired.push(store.add_reservation(
            car.id,
            day(2024, 1, 1),
            day(2024, 1, 3),
            ReservationStatus::Confirmed,
        ));
    }

    let report = reconciliation.run_at(day(2024, 2, 1)).await.unwrap();

    assert_eq!(report.completed, 3);
    assert_eq!(report.cars_released, 3);
    for reservation in expired {
        assert_eq!(
            store.reservation(reservation.id).unwrap().status,
            ReservationStatus::Completed
        );
        assert_eq!(
            store.car(reservation.car_id).unwrap().status,
            CarStatus::Available
        );
    }
}

#[tokio::test]
async fn test_unexpired_and_unconfirmed_reservations_are_left_alone() {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Reserved, dec!(30));
    let (_, reconciliation) = services(&store);
    let now = day(2024, 1, 10);

    // Ends exactly now: not yet expired
    let ending_now =
        store.add_reservation(car.id, day(2024, 1, 8), now, ReservationStatus::Confirmed);
    let pending = store.add_reservation(
        car.id,
        day(2024, 1, 1),
        day(2024, 1, 2),
        ReservationStatus::Pending,
    );

    let report = reconciliation.run_at(now).await.unwrap();

    assert_eq!(report, ReconciliationReport::default());
    assert_eq!(store.write_count(), 0);
    assert_eq!(
        store.reservation(ending_now.id).unwrap().status,
        ReservationStatus::Confirmed
    );
    assert_eq!(
        store.reservation(pending.id).unwrap().status,
        ReservationStatus::Pending
    );
}

#[tokio::test]
async fn test_car_kept_while_another_confirmed_reservation_covers_now() {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Reserved, dec!(30));
    let (_, reconciliation) = services(&store);
    let expired = store.add_reservation(
        car.id,
        day(2024, 1, 1),
        day(2024, 1, 5),
        ReservationStatus::Confirmed,
    );
    store.add_reservation(
        car.id,
        day(2024, 1, 5),
        day(2024, 1, 9),
        ReservationStatus::Confirmed,
    );

    let report = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(report.cars_released, 0);
    assert_eq!(
        store.reservation(expired.id).unwrap().status,
        ReservationStatus::Completed
    );
    assert_eq!(store.car(car.id).unwrap().status, CarStatus::Reserved);
}

#[tokio::test]
async fn test_covering_check_ignores_reservation_status() {
    // A pending or completed reservation covering now also keeps the car
    for covering_status in [
        ReservationStatus::Pending,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ] {
        let store = MemoryStore::new();
        let car = store.add_car(CarStatus::Reserved, dec!(30));
        let (_, reconciliation) = services(&store);
        let expired = store.add_reservation(
            car.id,
            day(2024, 1, 1),
            day(2024, 1, 5),
            ReservationStatus::Confirmed,
        );
        store.add_reservation(car.id, day(2024, 1, 6), day(2024, 1, 8), covering_status);

        reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

        assert_eq!(
            store.reservation(expired.id).unwrap().status,
            ReservationStatus::Completed
        );
        assert_eq!(
            store.car(car.id).unwrap().status,
            CarStatus::Reserved,
            "{covering_status}"
        );
    }
}

#[tokio::test]
async fn test_future_reservation_does_not_keep_car() {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Reserved, dec!(30));
    let (_, reconciliation) = services(&store);
    store.add_reservation(
        car.id,
        day(2024, 1, 1),
        day(2024, 1, 5),
        ReservationStatus::Confirmed,
    );
    store.add_reservation(
        car.id,
        day(2024, 1, 20),
        day(2024, 1, 25),
        ReservationStatus::Confirmed,
    );

    reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(store.car(car.id).unwrap().status, CarStatus::Available);
}

#[tokio::test]
async fn test_missing_car_still_completes_reservation() {
    let store = MemoryStore::new();
    let (_, reconciliation) = services(&store);
    let reservation = store.add_reservation(
        Uuid::new_v4(),
        day(2024, 1, 1),
        day(2024, 1, 5),
        ReservationStatus::Confirmed,
    );

    let report = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(report.completed, 1);
    assert_eq!(report.cars_released, 0);
    assert_eq!(
        store.reservation(reservation.id).unwrap().status,
        ReservationStatus::Completed
    );
}

#[tokio::test]
async fn test_available_car_is_not_rewritten() {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Available, dec!(30));
    let (_, reconciliation) = services(&store);
    store.add_reservation(
        car.id,
        day(2024, 1, 1),
        day(2024, 1, 5),
        ReservationStatus::Confirmed,
    );

    let report = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(report.cars_released, 0);
    // Only the reservation status write
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_second_pass_performs_no_writes() {
    let store = MemoryStore::new();
    let (_, reconciliation) = services(&store);
    for _ in 0..2 {
        let car = store.add_car(CarStatus::Reserved, dec!(30));
        store.add_reservation(
            car.id,
            day(2024, 1, 1),
            day(2024, 1, 5),
            ReservationStatus::Confirmed,
        );
    }
    let now = day(2024, 1, 6);

    reconciliation.run_at(now).await.unwrap();
    let writes = store.write_count();
    assert_eq!(writes, 4);

    let second = reconciliation.run_at(now).await.unwrap();

    assert_eq!(second, ReconciliationReport::default());
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_failure_on_one_reservation_does_not_stop_the_sweep() {
    let store = MemoryStore::new();
    let (_, reconciliation) = services(&store);
    let car_a = store.add_car(CarStatus::Reserved, dec!(30));
    let car_b = store.add_car(CarStatus::Reserved, dec!(30));
    let broken = store.add_reservation(
        car_a.id,
        day(2024, 1, 1),
        day(2024, 1, 3),
        ReservationStatus::Confirmed,
    );
    let healthy = store.add_reservation(
        car_b.id,
        day(2024, 1, 1),
        day(2024, 1, 4),
        ReservationStatus::Confirmed,
    );
    *store.fail_reservation_update.lock() = Some(broken.id);

    let report = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();

    assert_eq!(report.examined, 2);
    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(
        store.reservation(healthy.id).unwrap().status,
        ReservationStatus::Completed
    );
    assert_eq!(
        store.reservation(broken.id).unwrap().status,
        ReservationStatus::Confirmed
    );

    // Retried on the next pass once the store recovers
    *store.fail_reservation_update.lock() = None;
    let retry = reconciliation.run_at(day(2024, 1, 6)).await.unwrap();
    assert_eq!(retry.completed, 1);
    assert_eq!(
        store.reservation(broken.id).unwrap().status,
        ReservationStatus::Completed
    );
}

#[tokio::test]
async fn test_listing_failure_is_returned() {
    let store = MemoryStore::new();
    let (_, reconciliation) = services(&store);
    store.fail_expired_query.store(true, Ordering::SeqCst);

    assert!(reconciliation.run_at(day(2024, 1, 6)).await.is_err());
}

/// Car held by an expired confirmed booking, plus a pending future one
struct ApproveVsSweep {
    store: Arc<MemoryStore>,
    car_id: Uuid,
    expired_id: Uuid,
    pending_id: Uuid,
    approve: AppResult<()>,
    report: ReconciliationReport,
}

/// Queue approve and the sweep on the car lock in the given order, then let
/// them run
async fn approve_against_sweep(approve_first: bool) -> ApproveVsSweep {
    let store = MemoryStore::new();
    let car = store.add_car(CarStatus::Reserved, dec!(50));
    let locks = Arc::new(CarLocks::new());
    let (lifecycle, reconciliation, _) = services_with_fleet(&store, locks.clone());

    let expired = store.add_reservation(
        car.id,
        day(2024, 1, 1),
        day(2024, 1, 5),
        ReservationStatus::Confirmed,
    );
    let pending = lifecycle
        .create(Uuid::new_v4(), car.id, day(2024, 3, 1), day(2024, 3, 5), dec!(200))
        .await
        .unwrap();
    let now = day(2024, 2, 1);

    let held = locks.acquire(car.id).await;
    let release = async move {
        tokio::task::yield_now().await;
        drop(held);
    };

    let (approve, report) = if approve_first {
        let (approve, report, _) = tokio::join!(
            lifecycle.approve(pending.id),
            reconciliation.run_at(now),
            release
        );
        (approve, report)
    } else {
        let (report, approve, _) = tokio::join!(
            reconciliation.run_at(now),
            lifecycle.approve(pending.id),
            release
        );
        (approve, report)
    };

    ApproveVsSweep {
        store,
        car_id: car.id,
        expired_id: expired.id,
        pending_id: pending.id,
        approve: approve.map(|_| ()),
        report: report.unwrap(),
    }
}

fn assert_serialized(outcome: &ApproveVsSweep) {
    let car = outcome.store.car(outcome.car_id).unwrap();
    let pending = outcome.store.reservation(outcome.pending_id).unwrap();

    assert_eq!(
        outcome.store.reservation(outcome.expired_id).unwrap().status,
        ReservationStatus::Completed
    );
    assert_eq!(outcome.report.completed, 1);
    assert_eq!(outcome.report.cars_released, 1);

    // The car is reserved exactly when the second booking was confirmed
    match pending.status {
        ReservationStatus::Confirmed => {
            assert!(outcome.approve.is_ok());
            assert_eq!(car.status, CarStatus::Reserved);
        }
        ReservationStatus::Pending => {
            assert!(matches!(outcome.approve, Err(AppError::InvalidState(_))));
            assert_eq!(car.status, CarStatus::Available);
        }
        other => panic!("unexpected status {}", other),
    }
}

#[tokio::test]
async fn test_approve_queued_before_sweep_sees_reserved_car() {
    let outcome = approve_against_sweep(true).await;

    assert_serialized(&outcome);
    assert!(matches!(outcome.approve, Err(AppError::InvalidState(_))));
    assert_eq!(
        outcome.store.car(outcome.car_id).unwrap().status,
        CarStatus::Available
    );
}

#[tokio::test]
async fn test_sweep_queued_before_approve_frees_car_for_it() {
    let outcome = approve_against_sweep(false).await;

    assert_serialized(&outcome);
    assert!(outcome.approve.is_ok());
    assert_eq!(
        outcome.store.car(outcome.car_id).unwrap().status,
        CarStatus::Reserved
    );
}

#[tokio::test]
async fn test_unforced_approve_and_sweep_stay_serialized() {
    for _ in 0..20 {
        let store = MemoryStore::new();
        let car = store.add_car(CarStatus::Reserved, dec!(50));
        let (lifecycle, reconciliation) = services(&store);
        let expired = store.add_reservation(
            car.id,
            day(2024, 1, 1),
            day(2024, 1, 5),
            ReservationStatus::Confirmed,
        );
        let pending = lifecycle
            .create(Uuid::new_v4(), car.id, day(2024, 3, 1), day(2024, 3, 5), dec!(200))
            .await
            .unwrap();

        let (approve, report) = tokio::join!(
            lifecycle.approve(pending.id),
            reconciliation.run_at(day(2024, 2, 1))
        );

        assert_serialized(&ApproveVsSweep {
            store,
            car_id: car.id,
            expired_id: expired.id,
            pending_id: pending.id,
            approve: approve.map(|_| ()),
            report: report.unwrap(),
        });
    }
}
