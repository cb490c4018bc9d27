//! Health check

use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::warn;

/// Liveness and database reachability
///
/// GET /api/v1/health
pub async fn health_check(pool: Option<web::Data<PgPool>>) -> HttpResponse {
    let database = match pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
            Ok(_) => "up",
            Err(e) => {
                warn!(error = %e, "Health check could not reach the database");
                "down"
            }
        },
        None => "unconfigured",
    };

    let body = serde_json::json!({
        "status": if database == "down" { "degraded" } else { "healthy" },
        "service": "rentacar",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    });

    if database == "down" {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

/// Configure health route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
