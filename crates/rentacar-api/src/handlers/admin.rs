//! Administrative triggers

use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use rentacar_auth::AdminUser;
use rentacar_core::AppError;
use rentacar_services::{CarLocks, PgReconciliationJob};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};

/// Run one reconciliation pass now
///
/// Meant for an external cron when the in-process scheduler is disabled.
///
/// POST /api/v1/admin/reconcile
#[instrument(skip(pool, locks, admin))]
pub async fn reconcile(
    pool: web::Data<PgPool>,
    locks: web::Data<Arc<CarLocks>>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    info!(admin = %admin.user_id(), "Manual reconciliation requested");

    let report = PgReconciliationJob::from_pool(pool.get_ref().clone(), locks.get_ref().clone())
        .run()
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        report,
        "Reconciliation pass finished",
    )))
}

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/reconcile", web::post().to(reconcile)));
}
