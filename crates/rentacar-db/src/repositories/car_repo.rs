//! Car repository implementation
//!
//! PostgreSQL-backed storage for the vehicle inventory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentacar_core::{
    models::{Car, CarSize, CarStatus, FuelType, Transmission},
    traits::{CarFilter, CarRepository, Repository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const CAR_COLUMNS: &str = r#"
    id, make, model, year, fuel_type, transmission, mileage, size,
    daily_rate, image_url, status, created_at, updated_at
"#;

/// PostgreSQL implementation of CarRepository
pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    /// Create a new car repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_status(s: &str) -> CarStatus {
        CarStatus::from_str(s).unwrap_or(CarStatus::Available)
    }
}

#[async_trait]
impl Repository<Car, Uuid> for PgCarRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Car>> {
        debug!("Finding car by id: {}", id);

        let sql = format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS);
        let result = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding car {}: {}", id, e);
                AppError::Database(format!("Failed to find car: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Car>> {
        let sql = format!(
            "SELECT {} FROM cars ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            CAR_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing cars: {}", e);
                AppError::Database(format!("Failed to fetch cars: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting cars: {}", e);
                AppError::Database(format!("Failed to count cars: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Car) -> AppResult<Car> {
        debug!("Creating car: {}", entity.display_name());

        let sql = format!(
            r#"
            INSERT INTO cars (
                id, make, model, year, fuel_type, transmission, mileage, size,
                daily_rate, image_url, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            CAR_COLUMNS
        );
        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(entity.id)
            .bind(&entity.make)
            .bind(&entity.model)
            .bind(entity.year)
            .bind(entity.fuel_type.to_string())
            .bind(entity.transmission.to_string())
            .bind(entity.mileage)
            .bind(entity.size.to_string())
            .bind(entity.daily_rate)
            .bind(&entity.image_url)
            .bind(entity.status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating car: {}", e);
                AppError::Database(format!("Failed to create car: {}", e))
            })?;

        Ok(row.into())
    }

    /// Write everything but the status, which only `update_status` changes
    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Car) -> AppResult<Car> {
        debug!("Updating car: {}", entity.id);

        let sql = format!(
            r#"
            UPDATE cars
            SET make = $2,
                model = $3,
                year = $4,
                fuel_type = $5,
                transmission = $6,
                mileage = $7,
                size = $8,
                daily_rate = $9,
                image_url = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CAR_COLUMNS
        );
        let row = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(entity.id)
            .bind(&entity.make)
            .bind(&entity.model)
            .bind(entity.year)
            .bind(entity.fuel_type.to_string())
            .bind(entity.transmission.to_string())
            .bind(entity.mileage)
            .bind(entity.size.to_string())
            .bind(entity.daily_rate)
            .bind(&entity.image_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating car {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update car: {}", e))
            })?
            .ok_or_else(|| AppError::CarNotFound(entity.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting car: {}", id);

        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting car {}: {}", id, e);
                AppError::Database(format!("Failed to delete car: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &CarFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Car>, i64)> {
        debug!(
            "Listing cars with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        // NULL parameters disable their predicate
        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR make ILIKE $2)
              AND ($3::TEXT IS NULL OR fuel_type = $3)
              AND ($4::TEXT IS NULL OR transmission = $4)
              AND ($5::TEXT IS NULL OR size = $5)
              AND ($6::NUMERIC IS NULL OR daily_rate >= $6)
              AND ($7::NUMERIC IS NULL OR daily_rate <= $7)
        "#;

        let status = filter.status.map(|s| s.to_string());
        let make = filter.make.as_ref().map(|m| format!("%{}%", m));
        let fuel_type = filter.fuel_type.map(|f| f.to_string());
        let transmission = filter.transmission.map(|t| t.to_string());
        let size = filter.size.map(|s| s.to_string());

        let count_sql = format!("SELECT COUNT(*) FROM cars {}", WHERE_CLAUSE);
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&status)
            .bind(&make)
            .bind(&fuel_type)
            .bind(&transmission)
            .bind(&size)
            .bind(filter.min_rate)
            .bind(filter.max_rate)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting filtered cars: {}", e);
                AppError::Database(format!("Failed to count cars: {}", e))
            })?;

        let sql = format!(
            "SELECT {} FROM cars {} ORDER BY created_at DESC LIMIT $8 OFFSET $9",
            CAR_COLUMNS, WHERE_CLAUSE
        );
        let rows = sqlx::query_as::<sqlx::Postgres, CarRow>(&sql)
            .bind(&status)
            .bind(&make)
            .bind(&fuel_type)
            .bind(&transmission)
            .bind(&size)
            .bind(filter.min_rate)
            .bind(filter.max_rate)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching filtered cars: {}", e);
                AppError::Database(format!("Failed to fetch cars: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: CarStatus) -> AppResult<bool> {
        debug!("Updating car {} status to {}", id, status);

        let result = sqlx::query("UPDATE cars SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating car status {}: {}", id, e);
                AppError::Database(format!("Failed to update car status: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> AppResult<Vec<(CarStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM cars GROUP BY status ORDER BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting cars by status: {}", e);
                    AppError::Database(format!("Failed to count cars: {}", e))
                })?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (Self::parse_status(&status), count))
            .collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    make: String,
    model: String,
    year: i32,
    fuel_type: String,
    transmission: String,
    mileage: i32,
    size: String,
    daily_rate: Decimal,
    image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Self {
            id: row.id,
            make: row.make,
            model: row.model,
            year: row.year,
            fuel_type: FuelType::from_str(&row.fuel_type).unwrap_or_default(),
            transmission: Transmission::from_str(&row.transmission).unwrap_or_default(),
            mileage: row.mileage,
            size: CarSize::from_str(&row.size).unwrap_or_default(),
            daily_rate: row.daily_rate,
            image_url: row.image_url,
            status: PgCarRepository::parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
