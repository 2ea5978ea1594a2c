use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::models::errors::AppError;
use crate::services::onelake::OneLakeService;
use crate::AppState;

/// List the names of all PDF files in the configured OneLake folder.
pub async fn list_files(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<Value>)> {
    match app_state.storage.list_pdf_files().await {
        Ok(files) => Ok(Json(files)),
        Err(e) => {
            tracing::error!("Error listing files: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to list files",
                    "message": e.to_string()
                })),
            ))
        }
    }
}

/// Serve a single PDF from OneLake.
pub async fn download_file(
    State(app_state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    // Defense in depth: the service validates again before building a path.
    if !OneLakeService::validate_filename(&filename) {
        return Err(invalid_filename_response());
    }

    let bytes = match app_state.storage.download_pdf(&filename).await {
        Ok(bytes) => bytes,
        Err(AppError::InvalidFilename { .. }) => {
            return Err(invalid_filename_response());
        }
        Err(AppError::NotFound { .. }) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "File not found",
                    "message": format!("File not found: {}", filename)
                })),
            ));
        }
        Err(e) => {
            tracing::error!("Error downloading file '{}': {}", filename, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to download file",
                    "message": e.to_string()
                })),
            ));
        }
    };

    let headers = [
        (
            header::CONTENT_TYPE,
            mime::APPLICATION_PDF.as_ref().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        ),
        (header::CACHE_CONTROL, "no-store".to_string()),
    ];

    Ok((headers, bytes))
}

fn invalid_filename_response() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid filename",
            "message": "Only .pdf files with safe characters are allowed."
        })),
    )
}
