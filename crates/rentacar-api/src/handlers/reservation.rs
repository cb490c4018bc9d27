//! Reservation handlers
//!
//! Customers book and look up their own reservations; administrators list,
//! approve and reject. State changes go through the lifecycle service so the
//! statistics row and the car status follow the reservation.

use crate::dto::reservation::{CreateReservationRequest, ReservationFilterParams};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use rentacar_auth::{AdminUser, AuthenticatedUser};
use rentacar_core::models::ReservationStatus;
use rentacar_core::traits::{Repository, ReservationFilter, ReservationRepository};
use rentacar_core::AppError;
use rentacar_db::PgReservationRepository;
use rentacar_services::{CarLocks, PgReservationLifecycle};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

fn lifecycle(pool: &PgPool, locks: &Arc<CarLocks>) -> PgReservationLifecycle {
    PgReservationLifecycle::from_pool(pool.clone(), locks.clone())
}

fn validate_pagination(query: &PaginationParams) -> Result<(), AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::Validation(e.to_string())
    })
}

async fn list_page(
    pool: &PgPool,
    filter: &ReservationFilter,
    query: &PaginationParams,
) -> Result<HttpResponse, AppError> {
    let repo = PgReservationRepository::new(pool.clone());
    let (reservations, total) = repo
        .list_filtered(filter, query.limit(), query.offset())
        .await?;

    Ok(HttpResponse::Ok().json(query.paginate(reservations, total)))
}

/// Book a car for the authenticated user
///
/// POST /api/v1/reservations
#[instrument(skip(pool, locks, user, req))]
pub async fn create_reservation(
    pool: web::Data<PgPool>,
    locks: web::Data<Arc<CarLocks>>,
    user: AuthenticatedUser,
    req: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Reservation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let service = lifecycle(pool.get_ref(), locks.get_ref());
    let reservation = match req.total_cost {
        Some(total_cost) => {
            service
                .create(
                    user.user_id(),
                    req.car_id,
                    req.start_date,
                    req.end_date,
                    total_cost,
                )
                .await?
        }
        None => {
            service
                .create_quoted(user.user_id(), req.car_id, req.start_date, req.end_date)
                .await?
        }
    };

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        reservation,
        "Reservation created, awaiting approval",
    )))
}

/// Reservations of the authenticated user
///
/// GET /api/v1/reservations/mine
#[instrument(skip(pool, user))]
pub async fn list_my_reservations(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    validate_pagination(&query)?;

    let filter = ReservationFilter {
        user_id: Some(user.user_id()),
        ..Default::default()
    };
    list_page(pool.get_ref(), &filter, &query).await
}

/// All reservations, filtered
///
/// GET /api/v1/reservations
#[instrument(skip(pool, _admin))]
pub async fn list_reservations(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    filters: web::Query<ReservationFilterParams>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    validate_pagination(&query)?;

    let filter = filters.to_filter()?;
    debug!(?filter, "Listing reservations");

    list_page(pool.get_ref(), &filter, &query).await
}

/// Reservations awaiting a decision
///
/// GET /api/v1/reservations/pending
#[instrument(skip(pool, _admin))]
pub async fn list_pending_reservations(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    validate_pagination(&query)?;

    let filter = ReservationFilter {
        status: Some(ReservationStatus::Pending),
        ..Default::default()
    };
    list_page(pool.get_ref(), &filter, &query).await
}

/// Get one reservation; owners and administrators only
///
/// Someone else's reservation reads as not found.
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(pool, user))]
pub async fn get_reservation(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservation = repo
        .find_by_id(reservation_id)
        .await?
        .filter(|r| user.can_access(r.user_id))
        .ok_or_else(|| AppError::ReservationNotFound(reservation_id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(reservation)))
}

/// Approve a pending reservation
///
/// POST /api/v1/reservations/{id}/approve
#[instrument(skip(pool, locks, admin))]
pub async fn approve_reservation(
    pool: web::Data<PgPool>,
    locks: web::Data<Arc<CarLocks>>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    debug!(reservation_id = %reservation_id, admin = %admin.user_id(), "Approving reservation");

    let reservation = lifecycle(pool.get_ref(), locks.get_ref())
        .approve(reservation_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        reservation,
        "Reservation approved",
    )))
}

/// Reject a pending reservation
///
/// The reservation and its statistics row are removed; the response carries
/// the last state with status `cancelled`.
///
/// POST /api/v1/reservations/{id}/reject
#[instrument(skip(pool, locks, admin))]
pub async fn reject_reservation(
    pool: web::Data<PgPool>,
    locks: web::Data<Arc<CarLocks>>,
    path: web::Path<Uuid>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    debug!(reservation_id = %reservation_id, admin = %admin.user_id(), "Rejecting reservation");

    let reservation = lifecycle(pool.get_ref(), locks.get_ref())
        .reject(reservation_id)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        reservation,
        "Reservation rejected",
    )))
}

/// Configure reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("", web::get().to(list_reservations))
            .route("/mine", web::get().to(list_my_reservations))
            .route("/pending", web::get().to(list_pending_reservations))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}/approve", web::post().to(approve_reservation))
            .route("/{id}/reject", web::post().to(reject_reservation)),
    );
}
