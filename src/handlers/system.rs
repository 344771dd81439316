use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::resources::Collection;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let resources: Vec<String> = Collection::ALL
        .iter()
        .map(|c| format!("/api/v1/{}", c.path()))
        .collect();

    Json(json!({
        "success": true,
        "payload": {
            "name": "School Scheduler API",
            "version": env!("CARGO_PKG_VERSION"),
            "resources": resources,
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "payload": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "msg": "database unavailable",
                    "payload": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "msg": "Route not found", "success": false })),
    )
}
