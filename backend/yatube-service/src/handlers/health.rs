/// Health endpoints for load balancers and orchestrators
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    storage: String,
    latency_ms: u64,
    timestamp: String,
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "yatube-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once storage answers.
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.store.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, storage) = match result {
        Ok(()) => (true, "ok".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (false, e.to_string())
        }
    };

    let response = ReadinessResponse {
        ready,
        storage,
        latency_ms,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
