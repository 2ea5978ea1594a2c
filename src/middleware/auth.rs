use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::errors::AppError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret gate in front of the file routes.
///
/// Stands in for real Entra ID token validation: the header value is compared
/// for exact equality against the configured key. CORS preflight requests
/// pass through so browser negotiation succeeds without credentials.
pub async fn require_api_key(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    match request.headers().get(API_KEY_HEADER) {
        None => unauthorized(AppError::unauthenticated(
            "Missing authentication credentials. Provide X-API-Key header.",
        )),
        Some(value) if value.as_bytes() != app_state.config.api_key.as_bytes() => {
            unauthorized(AppError::unauthenticated("Invalid API key."))
        }
        Some(_) => next.run(request).await,
    }
}

fn unauthorized(error: AppError) -> Response {
    let message = match error {
        AppError::Unauthenticated { message } => message,
        other => other.to_string(),
    };

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
