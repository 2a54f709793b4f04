use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Church SSL API",
            "version": version,
            "description": "Sabbath school lesson publishing backend",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "languages": "/api/languages[/:id]",
                "lessons": "/api/lessons[/:id]",
                "lesson_sections": "/api/lessons/:id/sections",
                "lesson_queries": "/api/lessons/list, /api/lessons/search, /api/lessons/by-quarter, /api/lessons/years",
                "bulk_delete": "/api/lessons/delete",
                "sections": "/api/sections",
                "notifications": "/api/notifications",
            }
        }
    }))
}

/// GET /health - Store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.service.store().ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
