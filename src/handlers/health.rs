use axum::response::Json;
use serde_json::{json, Value};

/// Liveness probe, always returns 200. Not behind the API key.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy"
    }))
}
