use axum::{extract::Extension, http::{StatusCode, Uri}, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::SharedStorage;
use crate::error::ApiError;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Students API",
        "version": version,
        "description": "CRUD service for student records",
        "endpoints": {
            "health": "GET /health",
            "create": "POST /students",
            "list": "GET /students",
            "show": "GET /students/:id",
            "update": "PATCH /students/:id",
            "delete": "DELETE /students/:id",
        }
    }))
}

/// GET /health - storage connectivity probe
pub async fn health(Extension(storage): Extension<SharedStorage>) -> axum::response::Response {
    let now = chrono::Utc::now();

    match storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "timestamp": now,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable(format!("database unavailable: {e}")).into_response()
        }
    }
}

/// Fallback for unmatched routes, so they get the error envelope too
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}
