//! Statistics repository implementation
//!
//! Revenue shadow records, one per live reservation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rentacar_core::{
    models::{DailyRevenue, PaymentStatus, Statistics},
    traits::{Repository, StatisticsRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of StatisticsRepository
pub struct PgStatisticsRepository {
    pool: PgPool,
}

impl PgStatisticsRepository {
    /// Create a new statistics repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_status(s: &str) -> PaymentStatus {
        PaymentStatus::from_str(s).unwrap_or(PaymentStatus::Pending)
    }
}

#[async_trait]
impl Repository<Statistics, Uuid> for PgStatisticsRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Statistics>> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT id, date, revenue, payment_status, reservation_id, created_at
            FROM statistics
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding statistics {}: {}", id, e);
            AppError::Database(format!("Failed to find statistics: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Statistics>> {
        let rows = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT id, date, revenue, payment_status, reservation_id, created_at
            FROM statistics
            ORDER BY date DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing statistics: {}", e);
            AppError::Database(format!("Failed to fetch statistics: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM statistics")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count statistics: {}", e)))?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Statistics) -> AppResult<Statistics> {
        debug!(
            "Creating statistics {} for reservation {}",
            entity.id, entity.reservation_id
        );

        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            INSERT INTO statistics (id, date, revenue, payment_status, reservation_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, date, revenue, payment_status, reservation_id, created_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.date)
        .bind(entity.revenue)
        .bind(entity.payment_status.to_string())
        .bind(entity.reservation_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating statistics: {}", e);
            AppError::Database(format!("Failed to create statistics: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Statistics) -> AppResult<Statistics> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            UPDATE statistics
            SET date = $2, revenue = $3, payment_status = $4
            WHERE id = $1
            RETURNING id, date, revenue, payment_status, reservation_id, created_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.date)
        .bind(entity.revenue)
        .bind(entity.payment_status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating statistics {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update statistics: {}", e))
        })?
        .ok_or_else(|| AppError::StatisticsNotFound(entity.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting statistics: {}", id);

        let result = sqlx::query("DELETE FROM statistics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting statistics {}: {}", id, e);
                AppError::Database(format!("Failed to delete statistics: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StatisticsRepository for PgStatisticsRepository {
    #[instrument(skip(self))]
    async fn find_by_reservation(&self, reservation_id: Uuid) -> AppResult<Option<Statistics>> {
        let row = sqlx::query_as::<_, StatisticsRow>(
            r#"
            SELECT id, date, revenue, payment_status, reservation_id, created_at
            FROM statistics
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Database error finding statistics for reservation {}: {}",
                reservation_id, e
            );
            AppError::Database(format!("Failed to find statistics: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn update_payment_status(&self, id: Uuid, status: PaymentStatus) -> AppResult<bool> {
        debug!("Updating statistics {} payment status to {}", id, status);

        let result = sqlx::query("UPDATE statistics SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating payment status {}: {}", id, e);
                AppError::Database(format!("Failed to update payment status: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn sum_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> AppResult<Decimal> {
        let result: (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(revenue), 0)
            FROM statistics
            WHERE ($1::DATE IS NULL OR date >= $1)
              AND ($2::DATE IS NULL OR date <= $2)
              AND ($3::TEXT IS NULL OR payment_status = $3)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(status.map(|s| s.to_string()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error summing revenue: {}", e);
            AppError::Database(format!("Failed to sum revenue: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn daily_revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        status: Option<PaymentStatus>,
    ) -> AppResult<Vec<DailyRevenue>> {
        let rows: Vec<(NaiveDate, Decimal, i64)> = sqlx::query_as(
            r#"
            SELECT date, COALESCE(SUM(revenue), 0), COUNT(*)
            FROM statistics
            WHERE ($1::DATE IS NULL OR date >= $1)
              AND ($2::DATE IS NULL OR date <= $2)
              AND ($3::TEXT IS NULL OR payment_status = $3)
            GROUP BY date
            ORDER BY date ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error grouping revenue: {}", e);
            AppError::Database(format!("Failed to fetch daily revenue: {}", e))
        })?;

        Ok(rows
            .into_iter()
            .map(|(date, revenue, reservations)| DailyRevenue {
                date,
                revenue,
                reservations,
            })
            .collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatisticsRow {
    id: Uuid,
    date: NaiveDate,
    revenue: Decimal,
    payment_status: String,
    reservation_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<StatisticsRow> for Statistics {
    fn from(row: StatisticsRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            revenue: row.revenue,
            payment_status: PgStatisticsRepository::parse_status(&row.payment_status),
            reservation_id: row.reservation_id,
            created_at: row.created_at,
        }
    }
}
