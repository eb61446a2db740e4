// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::web::types::{AppState, HealthResponse};

pub async fn health_handler(state: &State<AppState>) -> Json<HealthResponse> {
    let model_configured = state.parser.model_configured();
    let database_ok = state.parser.store_healthy().await;

    info!(
        "Health check: model_configured={}, database_ok={}",
        model_configured, database_ok
    );

    Json(HealthResponse {
        success: model_configured && database_ok,
        status: if model_configured && database_ok {
            "ok"
        } else {
            "degraded"
        },
        model_configured,
        database: if database_ok { "ok" } else { "unavailable" },
    })
}
