//! Reservation repository implementation
//!
//! Provides PostgreSQL-backed storage for car reservations, including the
//! range queries the reconciliation sweep relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentacar_core::{
    models::{Reservation, ReservationStatus},
    traits::{Repository, ReservationFilter, ReservationRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = r#"
    id, user_id, car_id, start_date, end_date, status, total_cost,
    created_at, updated_at
"#;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse reservation status from string
    fn parse_status(s: &str) -> ReservationStatus {
        ReservationStatus::from_str(s).unwrap_or(ReservationStatus::Pending)
    }

    async fn fetch_rows(&self, sql: &str, what: &str) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching {}: {}", what, e);
                AppError::Database(format!("Failed to fetch {}: {}", what, e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl Repository<Reservation, Uuid> for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let sql = format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        );
        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding reservation {}: {}", id, e);
                AppError::Database(format!("Failed to find reservation: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations ORDER BY created_at DESC LIMIT {} OFFSET {}",
            RESERVATION_COLUMNS, limit, offset
        );
        self.fetch_rows(&sql, "reservations").await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting reservations: {}", e);
                AppError::Database(format!("Failed to count reservations: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Reservation) -> AppResult<Reservation> {
        debug!(
            "Creating reservation {} for car {} by user {}",
            entity.id, entity.car_id, entity.user_id
        );

        let sql = format!(
            r#"
            INSERT INTO reservations (
                id, user_id, car_id, start_date, end_date, status, total_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );
        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(entity.id)
            .bind(entity.user_id)
            .bind(entity.car_id)
            .bind(entity.start_date)
            .bind(entity.end_date)
            .bind(entity.status.to_string())
            .bind(entity.total_cost)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating reservation: {}", e);
                AppError::Database(format!("Failed to create reservation: {}", e))
            })?;

        info!(
            reservation_id = %row.id,
            car_id = %row.car_id,
            "Reservation stored"
        );

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Reservation) -> AppResult<Reservation> {
        debug!("Updating reservation: {}", entity.id);

        let sql = format!(
            r#"
            UPDATE reservations
            SET user_id = $2,
                car_id = $3,
                start_date = $4,
                end_date = $5,
                status = $6,
                total_cost = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );
        let row = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(entity.id)
            .bind(entity.user_id)
            .bind(entity.car_id)
            .bind(entity.start_date)
            .bind(entity.end_date)
            .bind(entity.status.to_string())
            .bind(entity.total_cost)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating reservation {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update reservation: {}", e))
            })?
            .ok_or_else(|| AppError::ReservationNotFound(entity.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting reservation: {}", id);

        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting reservation {}: {}", id, e);
                AppError::Database(format!("Failed to delete reservation: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        filter: &ReservationFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        debug!(
            "Listing reservations with filters: {:?}, limit={}, offset={}",
            filter, limit, offset
        );

        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR car_id = $2)
              AND ($3::UUID IS NULL OR user_id = $3)
        "#;

        let status = filter.status.map(|s| s.to_string());

        let count_sql = format!("SELECT COUNT(*) FROM reservations {}", WHERE_CLAUSE);
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&status)
            .bind(filter.car_id)
            .bind(filter.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting reservations: {}", e);
                AppError::Database(format!("Failed to count reservations: {}", e))
            })?;

        let sql = format!(
            "SELECT {} FROM reservations {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            RESERVATION_COLUMNS, WHERE_CLAUSE
        );
        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(&status)
            .bind(filter.car_id)
            .bind(filter.user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching reservations: {}", e);
                AppError::Database(format!("Failed to fetch reservations: {}", e))
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn find_expired_confirmed(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        debug!("Finding confirmed reservations ended before {}", now);

        let sql = format!(
            r#"
            SELECT {} FROM reservations
            WHERE status = 'confirmed' AND end_date < $1
            ORDER BY end_date ASC
            "#,
            RESERVATION_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding expired reservations: {}", e);
                AppError::Database(format!("Failed to find expired reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_covering(
        &self,
        car_id: Uuid,
        at: DateTime<Utc>,
        exclude: Uuid,
    ) -> AppResult<Vec<Reservation>> {
        // Status is deliberately not filtered here
        let sql = format!(
            r#"
            SELECT {} FROM reservations
            WHERE car_id = $1
              AND id <> $3
              AND start_date <= $2
              AND end_date >= $2
            "#,
            RESERVATION_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(car_id)
            .bind(at)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding covering reservations: {}", e);
                AppError::Database(format!("Failed to find reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_overlapping_live(
        &self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            r#"
            SELECT {} FROM reservations
            WHERE car_id = $1
              AND status IN ('pending', 'confirmed')
              AND start_date <= $3
              AND end_date >= $2
            ORDER BY start_date ASC
            "#,
            RESERVATION_COLUMNS
        );
        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&sql)
            .bind(car_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding overlapping reservations: {}", e);
                AppError::Database(format!("Failed to find reservations: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> AppResult<bool> {
        debug!("Updating reservation {} status to {}", id, status);

        let result = sqlx::query(
            "UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating reservation status {}: {}", id, e);
            AppError::Database(format!("Failed to update reservation status: {}", e))
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> AppResult<Vec<(ReservationStatus, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM reservations GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting reservations by status: {}", e);
            AppError::Database(format!("Failed to count reservations: {}", e))
        })?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| (Self::parse_status(&status), count))
            .collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: Uuid,
    car_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
    total_cost: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            start_date: row.start_date,
            end_date: row.end_date,
            status: PgReservationRepository::parse_status(&row.status),
            total_cost: row.total_cost,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
