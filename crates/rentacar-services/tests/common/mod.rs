//! In-memory repositories for service tests
//!
//! One `MemoryStore` backs three thin wrappers, one per repository trait.
//! Every mutating call bumps `writes`; the `fail_*` switches inject store
//! errors.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use rentacar_core::{
    models::{
        Car, CarStatus, DailyRevenue, PaymentStatus, Reservation, ReservationStatus, Statistics,
    },
    traits::{
        CarFilter, CarRepository, Repository, ReservationFilter, ReservationRepository,
        StatisticsRepository,
    },
    AppError, AppResult,
};
use rentacar_services::{CarLocks, FleetManager, ReconciliationJob, ReservationLifecycle};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    pub cars: Mutex<HashMap<Uuid, Car>>,
    pub reservations: Mutex<HashMap<Uuid, Reservation>>,
    pub statistics: Mutex<HashMap<Uuid, Statistics>>,
    pub writes: AtomicUsize,
    pub fail_statistics_create: AtomicBool,
    pub fail_statistics_delete: AtomicBool,
    pub fail_car_status_update: AtomicBool,
    pub fail_expired_query: AtomicBool,
    /// Reservation whose status update fails
    pub fail_reservation_update: Mutex<Option<Uuid>>,
}

fn store_error(what: &str) -> AppError {
    AppError::Database(format!("injected failure: {}", what))
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn add_car(&self, status: CarStatus, daily_rate: Decimal) -> Car {
        let car = Car {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            status,
            daily_rate,
            ..Default::default()
        };
        self.cars.lock().insert(car.id, car.clone());
        car
    }

    /// Insert a reservation directly, bypassing the lifecycle
    pub fn add_reservation(
        &self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: ReservationStatus,
    ) -> Reservation {
        let mut reservation = Reservation::new(Uuid::new_v4(), car_id, start, end, Decimal::ONE);
        reservation.status = status;
        self.reservations
            .lock()
            .insert(reservation.id, reservation.clone());
        reservation
    }

    pub fn car(&self, id: Uuid) -> Option<Car> {
        self.cars.lock().get(&id).cloned()
    }

    pub fn reservation(&self, id: Uuid) -> Option<Reservation> {
        self.reservations.lock().get(&id).cloned()
    }

    pub fn statistics_for(&self, reservation_id: Uuid) -> Vec<Statistics> {
        self.statistics
            .lock()
            .values()
            .filter(|s| s.reservation_id == reservation_id)
            .cloned()
            .collect()
    }

    pub fn remove_statistics_for(&self, reservation_id: Uuid) {
        self.statistics
            .lock()
            .retain(|_, s| s.reservation_id != reservation_id);
    }
}

pub struct MemoryCars(pub Arc<MemoryStore>);
pub struct MemoryReservations(pub Arc<MemoryStore>);
pub struct MemoryStatistics(pub Arc<MemoryStore>);

pub type TestLifecycle = ReservationLifecycle<MemoryCars, MemoryReservations, MemoryStatistics>;
pub type TestReconciliation = ReconciliationJob<MemoryCars, MemoryReservations>;
pub type TestFleet = FleetManager<MemoryCars>;

/// Lifecycle and reconciliation sharing one store and one lock table
pub fn services(store: &Arc<MemoryStore>) -> (TestLifecycle, TestReconciliation) {
    let (lifecycle, reconciliation, _) = services_with_fleet(store, Arc::new(CarLocks::new()));
    (lifecycle, reconciliation)
}

/// All three services over one store, sharing `locks`
pub fn services_with_fleet(
    store: &Arc<MemoryStore>,
    locks: Arc<CarLocks>,
) -> (TestLifecycle, TestReconciliation, TestFleet) {
    let fleet = FleetManager::new(Arc::new(MemoryCars(store.clone())), locks.clone());
    let lifecycle = ReservationLifecycle::new(
        Arc::new(MemoryCars(store.clone())),
        Arc::new(MemoryReservations(store.clone())),
        Arc::new(MemoryStatistics(store.clone())),
        locks.clone(),
    );
    let reconciliation = ReconciliationJob::new(
        Arc::new(MemoryCars(store.clone())),
        Arc::new(MemoryReservations(store.clone())),
        locks,
    );
    (lifecycle, reconciliation, fleet)
}

/// Midnight UTC on the given day
pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[async_trait]
impl Repository<Car, Uuid> for MemoryCars {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>> {
        Ok(self.0.car(id))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Car>> {
        Ok(self
            .0
            .cars
            .lock()
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.0.cars.lock().len() as i64)
    }

    async fn create(&self, entity: &Car) -> AppResult<Car> {
        self.0.wrote();
        self.0.cars.lock().insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Car) -> AppResult<Car> {
        self.0.wrote();
        let mut cars = self.0.cars.lock();
        match cars.get_mut(&entity.id) {
            // Status is left alone, as in the SQL update
            Some(car) => {
                let status = car.status;
                *car = entity.clone();
                car.status = status;
                Ok(car.clone())
            }
            None => Err(AppError::CarNotFound(entity.id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.0.wrote();
        Ok(self.0.cars.lock().remove(&id).is_some())
    }
}

#[async_trait]
impl CarRepository for MemoryCars {
    async fn list_filtered(
        &self,
        filter: &CarFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Car>, i64)> {
        let cars: Vec<Car> = self
            .0
            .cars
            .lock()
            .values()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        let total = cars.len() as i64;
        Ok((
            cars.into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            total,
        ))
    }

    async fn update_status(&self, id: Uuid, status: CarStatus) -> AppResult<bool> {
        if self.0.fail_car_status_update.load(Ordering::SeqCst) {
            return Err(store_error("car status update"));
        }
        self.0.wrote();
        Ok(match self.0.cars.lock().get_mut(&id) {
            Some(car) => {
                car.status = status;
                car.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn count_by_status(&self) -> AppResult<Vec<(CarStatus, i64)>> {
        let mut counts: HashMap<String, (CarStatus, i64)> = HashMap::new();
        for car in self.0.cars.lock().values() {
            counts.entry(car.status.to_string()).or_insert((car.status, 0)).1 += 1;
        }
        Ok(counts.into_values().collect())
    }
}

#[async_trait]
impl Repository<Reservation, Uuid> for MemoryReservations {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        Ok(self.0.reservation(id))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Reservation>> {
        Ok(self
            .0
            .reservations
            .lock()
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.0.reservations.lock().len() as i64)
    }

    async fn create(&self, entity: &Reservation) -> AppResult<Reservation> {
        self.0.wrote();
        self.0
            .reservations
            .lock()
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Reservation) -> AppResult<Reservation> {
        self.0.wrote();
        let mut reservations = self.0.reservations.lock();
        match reservations.get_mut(&entity.id) {
            Some(r) => {
                *r = entity.clone();
                Ok(entity.clone())
            }
            None => Err(AppError::ReservationNotFound(entity.id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.0.wrote();
        Ok(self.0.reservations.lock().remove(&id).is_some())
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservations {
    async fn list_filtered(
        &self,
        filter: &ReservationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let found: Vec<Reservation> = self
            .0
            .reservations
            .lock()
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.car_id.map_or(true, |c| r.car_id == c))
            .filter(|r| filter.user_id.map_or(true, |u| r.user_id == u))
            .cloned()
            .collect();
        let total = found.len() as i64;
        Ok((
            found
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            total,
        ))
    }

    async fn find_expired_confirmed(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        if self.0.fail_expired_query.load(Ordering::SeqCst) {
            return Err(store_error("expired reservations query"));
        }
        let mut found: Vec<Reservation> = self
            .0
            .reservations
            .lock()
            .values()
            .filter(|r| r.status == ReservationStatus::Confirmed && r.end_date < now)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.end_date);
        Ok(found)
    }

    async fn find_covering(
        &self,
        car_id: Uuid,
        at: DateTime<Utc>,
        exclude: Uuid,
    ) -> AppResult<Vec<Reservation>> {
        Ok(self
            .0
            .reservations
            .lock()
            .values()
            .filter(|r| r.car_id == car_id && r.id != exclude && r.covers(at))
            .cloned()
            .collect())
    }

    async fn find_overlapping_live(
        &self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        Ok(self
            .0
            .reservations
            .lock()
            .values()
            .filter(|r| r.car_id == car_id && r.status.is_live() && r.overlaps(start, end))
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> AppResult<bool> {
        if *self.0.fail_reservation_update.lock() == Some(id) {
            return Err(store_error("reservation status update"));
        }
        self.0.wrote();
        Ok(match self.0.reservations.lock().get_mut(&id) {
            Some(r) => {
                r.status = status;
                r.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ReservationStatus, i64)>> {
        let mut counts: HashMap<ReservationStatus, i64> = HashMap::new();
        for r in self.0.reservations.lock().values() {
            *counts.entry(r.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl Repository<Statistics, Uuid> for MemoryStatistics {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Statistics>> {
        Ok(self.0.statistics.lock().get(&id).cloned())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Statistics>> {
        Ok(self
            .0
            .statistics
            .lock()
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.0.statistics.lock().len() as i64)
    }

    async fn create(&self, entity: &Statistics) -> AppResult<Statistics> {
        if self.0.fail_statistics_create.load(Ordering::SeqCst) {
            return Err(store_error("statistics insert"));
        }
        self.0.wrote();
        self.0.statistics.lock().insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Statistics) -> AppResult<Statistics> {
        self.0.wrote();
        let mut statistics = self.0.statistics.lock();
        match statistics.get_mut(&entity.id) {
            Some(s) => {
                *s = entity.clone();
                Ok(entity.clone())
            }
            None => Err(AppError::StatisticsNotFound(entity.id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.0.fail_statistics_delete.load(Ordering::SeqCst) {
            return Err(store_error("statistics delete"));
        }
        self.0.wrote();
        Ok(self.0.statistics.lock().remove(&id).is_some())
    }
}

#[async_trait]
impl StatisticsRepository for MemoryStatistics {
    async fn find_by_reservation(&self, reservation_id: Uuid) -> AppResult<Option<Statistics>> {
        Ok(self.0.statistics_for(reservation_id).into_iter().next())
    }

    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> AppResult<bool> {
        self.0.wrote();
        Ok(match self.0.statistics.lock().get_mut(&id) {
            Some(s) => {
                s.payment_status = status;
                true
            }
            None => false,
        })
    }

    async fn sum_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> AppResult<Decimal> {
        Ok(self
            .0
            .statistics
            .lock()
            .values()
            .filter(|s| from.map_or(true, |f| s.date >= f))
            .filter(|s| to.map_or(true, |t| s.date <= t))
            .filter(|s| status.map_or(true, |p| s.payment_status == p))
            .map(|s| s.revenue)
            .sum())
    }

    async fn daily_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> AppResult<Vec<DailyRevenue>> {
        let mut days: HashMap<NaiveDate, (Decimal, i64)> = HashMap::new();
        for s in self.0.statistics.lock().values() {
            if from.map_or(true, |f| s.date >= f)
                && to.map_or(true, |t| s.date <= t)
                && status.map_or(true, |p| s.payment_status == p)
            {
                let entry = days.entry(s.date).or_insert((Decimal::ZERO, 0));
                entry.0 += s.revenue;
                entry.1 += 1;
            }
        }
        let mut out: Vec<DailyRevenue> = days
            .into_iter()
            .map(|(date, (revenue, reservations))| DailyRevenue {
                date,
                revenue,
                reservations,
            })
            .collect();
        out.sort_by_key(|d| d.date);
        Ok(out)
    }
}
