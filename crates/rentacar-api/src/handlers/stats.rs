//! Revenue statistics handlers (admin)

use crate::dto::stats::{DailyRevenueResponse, RevenueParams, RevenueResponse, SummaryResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use rentacar_auth::AdminUser;
use rentacar_core::models::PaymentStatus;
use rentacar_core::traits::{CarRepository, ReservationRepository, StatisticsRepository};
use rentacar_core::AppError;
use rentacar_db::{PgCarRepository, PgReservationRepository, PgStatisticsRepository};
use sqlx::PgPool;
use tracing::{debug, instrument};

/// Total revenue over an optional date range
///
/// GET /api/v1/stats/revenue?from=2024-01-01&to=2024-01-31&payment_status=confirmed
#[instrument(skip(pool, _admin))]
pub async fn get_revenue(
    pool: web::Data<PgPool>,
    query: web::Query<RevenueParams>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let (from, to, payment_status) = query.parse()?;

    let repo = PgStatisticsRepository::new(pool.get_ref().clone());
    let total_revenue = repo.sum_revenue(from, to, payment_status).await?;

    debug!(?from, ?to, total = %total_revenue, "Revenue computed");

    Ok(HttpResponse::Ok().json(ApiResponse::success(RevenueResponse {
        from,
        to,
        payment_status,
        total_revenue,
    })))
}

/// Revenue grouped by day
///
/// GET /api/v1/stats/revenue/daily
#[instrument(skip(pool, _admin))]
pub async fn get_daily_revenue(
    pool: web::Data<PgPool>,
    query: web::Query<RevenueParams>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let (from, to, payment_status) = query.parse()?;

    let repo = PgStatisticsRepository::new(pool.get_ref().clone());
    let days = repo.daily_revenue(from, to, payment_status).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(DailyRevenueResponse::new(
        from, to, days,
    ))))
}

/// Fleet and booking overview
///
/// GET /api/v1/stats/summary
#[instrument(skip(pool, _admin))]
pub async fn get_summary(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let car_repo = PgCarRepository::new(pool.get_ref().clone());
    let reservation_repo = PgReservationRepository::new(pool.get_ref().clone());
    let statistics_repo = PgStatisticsRepository::new(pool.get_ref().clone());

    let (cars, reservations, confirmed_revenue) = futures::try_join!(
        car_repo.count_by_status(),
        reservation_repo.count_by_status(),
        statistics_repo.sum_revenue(None, None, Some(PaymentStatus::Confirmed)),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SummaryResponse::new(
        cars,
        reservations,
        confirmed_revenue,
    ))))
}

/// Configure statistics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stats")
            .route("/revenue", web::get().to(get_revenue))
            .route("/revenue/daily", web::get().to(get_daily_revenue))
            .route("/summary", web::get().to(get_summary)),
    );
}
