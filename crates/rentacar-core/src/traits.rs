//! Common traits for repositories
//!
//! Defines the entity-store contract the services layer consumes: lookups by
//! identity and field predicates, range queries, inserts, updates and
//! deletes by identity, counts, and revenue sums.

use crate::error::AppError;
use crate::models::{
    Car, CarSize, CarStatus, DailyRevenue, FuelType, PaymentStatus, Reservation,
    ReservationStatus, Review, Statistics, Transmission, User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Car listing filters
#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    pub status: Option<CarStatus>,
    pub make: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub size: Option<CarSize>,
    pub min_rate: Option<Decimal>,
    pub max_rate: Option<Decimal>,
}

/// Car repository trait with specialized methods
#[async_trait]
pub trait CarRepository: Repository<Car, Uuid> {
    /// List cars with filtering
    async fn list_filtered(
        &self,
        filter: &CarFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Car>, i64), AppError>;

    /// Set a car's status; returns false if the car does not exist
    async fn update_status(&self, id: Uuid, status: CarStatus) -> Result<bool, AppError>;

    /// Number of cars per status
    async fn count_by_status(&self) -> Result<Vec<(CarStatus, i64)>, AppError>;
}

/// Reservation listing filters
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub car_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Reservation repository trait with specialized methods
#[async_trait]
pub trait ReservationRepository: Repository<Reservation, Uuid> {
    /// List reservations with filtering
    async fn list_filtered(
        &self,
        filter: &ReservationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Reservation>, i64), AppError>;

    /// Confirmed reservations whose end date is strictly before `now`
    async fn find_expired_confirmed(&self, now: DateTime<Utc>)
        -> Result<Vec<Reservation>, AppError>;

    /// Reservations on `car_id`, other than `exclude`, whose interval contains
    /// `at`. Matches every status.
    async fn find_covering(
        &self,
        car_id: Uuid,
        at: DateTime<Utc>,
        exclude: Uuid,
    ) -> Result<Vec<Reservation>, AppError>;

    /// Pending or confirmed reservations on `car_id` intersecting `[start, end]`
    async fn find_overlapping_live(
        &self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, AppError>;

    /// Set a reservation's status; returns false if it does not exist
    async fn update_status(&self, id: Uuid, status: ReservationStatus)
        -> Result<bool, AppError>;

    /// Number of reservations per status
    async fn count_by_status(&self) -> Result<Vec<(ReservationStatus, i64)>, AppError>;
}

/// Statistics repository trait with specialized methods
#[async_trait]
pub trait StatisticsRepository: Repository<Statistics, Uuid> {
    /// Find the shadow record of a reservation
    async fn find_by_reservation(&self, reservation_id: Uuid)
        -> Result<Option<Statistics>, AppError>;

    /// Set the payment status; returns false if the record does not exist
    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<bool, AppError>;

    /// Sum of revenue, optionally restricted to a date range and payment status
    async fn sum_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> Result<Decimal, AppError>;

    /// Revenue grouped by date, ascending
    async fn daily_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<DailyRevenue>, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, Uuid> {
    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

/// Review repository trait with specialized methods
#[async_trait]
pub trait ReviewRepository: Repository<Review, Uuid> {
    /// Reviews of one car, newest first
    async fn find_by_car(&self, car_id: Uuid) -> Result<Vec<Review>, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
