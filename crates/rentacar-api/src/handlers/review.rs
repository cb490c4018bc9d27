//! Car review handlers

use crate::dto::review::{CarReviewsResponse, CreateReviewRequest};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use rentacar_auth::AuthenticatedUser;
use rentacar_core::models::Review;
use rentacar_core::traits::{Repository, ReviewRepository};
use rentacar_core::AppError;
use rentacar_db::{PgCarRepository, PgReviewRepository};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Review a car
///
/// POST /api/v1/cars/{id}/reviews
#[instrument(skip(pool, user, req))]
pub async fn create_review(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
    req: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Review validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let car_id = path.into_inner();
    let car_repo = PgCarRepository::new(pool.get_ref().clone());
    if car_repo.find_by_id(car_id).await?.is_none() {
        return Err(AppError::CarNotFound(car_id.to_string()));
    }

    let comment = req
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let review = Review::new(user.user_id(), car_id, req.rating, comment);

    let repo = PgReviewRepository::new(pool.get_ref().clone());
    let created = repo.create(&review).await?;

    info!(
        review_id = %created.id,
        car_id = %car_id,
        rating = created.rating,
        "Review created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

/// Reviews of a car with their average rating
///
/// GET /api/v1/cars/{id}/reviews
#[instrument(skip(pool))]
pub async fn list_car_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let car_id = path.into_inner();

    let car_repo = PgCarRepository::new(pool.get_ref().clone());
    if car_repo.find_by_id(car_id).await?.is_none() {
        return Err(AppError::CarNotFound(car_id.to_string()));
    }

    let repo = PgReviewRepository::new(pool.get_ref().clone());
    let reviews = repo.find_by_car(car_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CarReviewsResponse::new(
        car_id, reviews,
    ))))
}

/// Delete a review; its author or an admin
///
/// DELETE /api/v1/reviews/{id}
#[instrument(skip(pool, user))]
pub async fn delete_review(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();

    let repo = PgReviewRepository::new(pool.get_ref().clone());
    let review = repo
        .find_by_id(review_id)
        .await?
        .ok_or_else(|| AppError::ReviewNotFound(review_id.to_string()))?;

    if !user.can_access(review.user_id) {
        warn!(
            review_id = %review_id,
            caller = %user.user_id(),
            "Review deletion refused"
        );
        return Err(AppError::Forbidden);
    }

    if !repo.delete(review_id).await? {
        return Err(AppError::ReviewNotFound(review_id.to_string()));
    }

    info!(review_id = %review_id, by = %user.user_id(), "Review deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// Configure review routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/cars/{id}/reviews", web::post().to(create_review))
        .route("/cars/{id}/reviews", web::get().to(list_car_reviews))
        .route("/reviews/{id}", web::delete().to(delete_review));
}
