//! Review repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentacar_core::{
    models::Review,
    traits::{Repository, ReviewRepository},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of ReviewRepository
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Review, Uuid> for PgReviewRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, user_id, car_id, rating, comment, created_at FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding review {}: {}", id, e);
            AppError::Database(format!("Failed to find review: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, user_id, car_id, rating, comment, created_at
            FROM reviews
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to fetch reviews: {}", e)))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count reviews: {}", e)))?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Review) -> AppResult<Review> {
        debug!("Creating review for car {}", entity.car_id);

        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (id, user_id, car_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, car_id, rating, comment, created_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.user_id)
        .bind(entity.car_id)
        .bind(entity.rating)
        .bind(&entity.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating review: {}", e);
            AppError::Database(format!("Failed to create review: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Review) -> AppResult<Review> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews
            SET rating = $2, comment = $3
            WHERE id = $1
            RETURNING id, user_id, car_id, rating, comment, created_at
            "#,
        )
        .bind(entity.id)
        .bind(entity.rating)
        .bind(&entity.comment)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update review: {}", e)))?
        .ok_or_else(|| AppError::ReviewNotFound(entity.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting review: {}", id);

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting review {}: {}", id, e);
                AppError::Database(format!("Failed to delete review: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    #[instrument(skip(self))]
    async fn find_by_car(&self, car_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, user_id, car_id, rating, comment, created_at
            FROM reviews
            WHERE car_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching reviews for car {}: {}", car_id, e);
            AppError::Database(format!("Failed to fetch reviews: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    car_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}
