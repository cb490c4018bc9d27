//! Car inventory handlers
//!
//! Listing and lookups are public; changes to the fleet need an admin.

use crate::dto::car::{
    AvailabilityParams, AvailabilityResponse, CarCreateRequest, CarFilterParams, CarUpdateRequest,
};
use crate::dto::{ApiResponse, PaginationParams};
use crate::handlers::count_live_reservations;
use actix_web::{web, HttpResponse};
use rentacar_auth::AdminUser;
use rentacar_core::models::{Car, CarStatus};
use rentacar_core::traits::{CarRepository, Repository, ReservationFilter, ReservationRepository};
use rentacar_core::AppError;
use rentacar_db::{PgCarRepository, PgReservationRepository};
use rentacar_services::{CarLocks, PgFleetManager};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

async fn load_car(repo: &PgCarRepository, car_id: Uuid) -> Result<Car, AppError> {
    repo.find_by_id(car_id)
        .await?
        .ok_or_else(|| AppError::CarNotFound(car_id.to_string()))
}

/// List cars with filters and pagination
///
/// GET /api/v1/cars
#[instrument(skip(pool))]
pub async fn list_cars(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<CarFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let filter = filters.to_filter()?;
    debug!(?filter, page = query.page, "Listing cars");

    let repo = PgCarRepository::new(pool.get_ref().clone());
    let (cars, total) = repo
        .list_filtered(&filter, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(query.paginate(cars, total)))
}

/// Get a single car
///
/// GET /api/v1/cars/{id}
#[instrument(skip(pool))]
pub async fn get_car(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let repo = PgCarRepository::new(pool.get_ref().clone());
    let car = load_car(&repo, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(car)))
}

/// Whether a car can be booked over an interval
///
/// A car is bookable when it is not in maintenance and no pending or
/// confirmed reservation intersects the interval.
///
/// GET /api/v1/cars/{id}/availability?start_date=..&end_date=..
#[instrument(skip(pool))]
pub async fn check_availability(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<AvailabilityParams>,
) -> Result<HttpResponse, AppError> {
    let car_id = path.into_inner();
    if query.start_date >= query.end_date {
        return Err(AppError::Validation(
            "start_date must be before end_date".to_string(),
        ));
    }

    let car_repo = PgCarRepository::new(pool.get_ref().clone());
    let car = load_car(&car_repo, car_id).await?;

    let reservation_repo = PgReservationRepository::new(pool.get_ref().clone());
    let conflicts = reservation_repo
        .find_overlapping_live(car_id, query.start_date, query.end_date)
        .await?;

    let available = car.status != CarStatus::Maintenance && conflicts.is_empty();
    debug!(
        car_id = %car_id,
        available,
        conflicts = conflicts.len(),
        "Availability checked"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(AvailabilityResponse {
        car_id,
        start_date: query.start_date,
        end_date: query.end_date,
        available,
        quote: car.quote(query.start_date, query.end_date),
        conflicting_reservations: conflicts.len(),
    })))
}

/// Add a car to the fleet
///
/// POST /api/v1/cars
#[instrument(skip(pool, admin, req))]
pub async fn create_car(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CarCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Car creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let car = req.to_car()?;
    let repo = PgCarRepository::new(pool.get_ref().clone());
    let created = repo.create(&car).await?;

    info!(
        car_id = %created.id,
        car = %created.display_name(),
        admin = %admin.user_id(),
        "Car created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        created,
        "Car created successfully",
    )))
}

/// Update a car
///
/// Runs under the car's lock; a status change is written on its own so an
/// edit never overwrites a status set by approval or reconciliation.
///
/// PUT /api/v1/cars/{id}
#[instrument(skip(pool, locks, admin, req))]
pub async fn update_car(
    pool: web::Data<PgPool>,
    locks: web::Data<Arc<CarLocks>>,
    path: web::Path<Uuid>,
    admin: AdminUser,
    req: web::Json<CarUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Car update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let status = req.requested_status()?;
    let fleet = PgFleetManager::from_pool(pool.get_ref().clone(), locks.get_ref().clone());
    let updated = fleet
        .update_car(path.into_inner(), status, |car| req.apply(car))
        .await?;

    info!(
        car_id = %updated.id,
        admin = %admin.user_id(),
        status = %updated.status,
        "Car updated"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        updated,
        "Car updated successfully",
    )))
}

/// Remove a car from the fleet
///
/// DELETE /api/v1/cars/{id}
#[instrument(skip(pool, admin))]
pub async fn delete_car(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let car_id = path.into_inner();

    let filter = ReservationFilter {
        car_id: Some(car_id),
        ..Default::default()
    };
    let live = count_live_reservations(pool.get_ref(), filter).await?;
    if live > 0 {
        return Err(AppError::Conflict(format!(
            "Car {} has {} live reservation(s)",
            car_id, live
        )));
    }

    let repo = PgCarRepository::new(pool.get_ref().clone());
    if !repo.delete(car_id).await? {
        return Err(AppError::CarNotFound(car_id.to_string()));
    }

    info!(car_id = %car_id, admin = %admin.user_id(), "Car deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// Configure car routes
///
/// Reviews under `/cars/{id}/reviews` are registered by the review module.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/cars", web::get().to(list_cars))
        .route("/cars", web::post().to(create_car))
        .route("/cars/{id}", web::get().to(get_car))
        .route("/cars/{id}", web::put().to(update_car))
        .route("/cars/{id}", web::delete().to(delete_car))
        .route("/cars/{id}/availability", web::get().to(check_availability));
}
