use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::services::TagRecordStore;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub api_prefix: String,
}

pub async fn health_check(
    state: web::Data<AppState>,
    store: web::Data<dyn TagRecordStore>,
) -> HttpResponse {
    let mut response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        api_prefix: state.config.api_prefix.clone(),
    };

    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(response),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            response.status = "unhealthy".to_string();
            HttpResponse::ServiceUnavailable().json(response)
        }
    }
}
