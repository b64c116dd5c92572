/// Health endpoints
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_summary))
        .route("/health/live", web::get().to(liveness_check));
}

/// Round trip to the persistence gateway.
pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.gateway.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "comment-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": format!("Storage check failed: {}", e),
                "service": "comment-service"
            }))
        }
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
