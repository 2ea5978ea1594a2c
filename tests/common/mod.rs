#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use lakeserve::{app_router, services::onelake::OneLakeService, utils::config::AppConfig, AppState};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_ORIGIN: &str = "http://localhost:5173";

pub const QUARTERLY_PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\nquarterly report body\n%%EOF";
pub const ALPHA_PDF: &[u8] = b"%PDF-1.7\nalpha body\n%%EOF";
pub const SPACED_PDF: &[u8] = b"%PDF-1.7\nspaced folder body\n%%EOF";

fn stored_file(path: &str) -> Option<&'static [u8]> {
    match path {
        "Reports.Lakehouse/Files/quarterly-report.pdf" => Some(QUARTERLY_PDF),
        "Reports.Lakehouse/Files/alpha.pdf" => Some(ALPHA_PDF),
        "Reports.Lakehouse/Quarterly Files/q1 summary.pdf" => Some(SPACED_PDF),
        _ => None,
    }
}

async fn token_endpoint() -> Json<Value> {
    Json(json!({
        "access_token": "test-token",
        "expires_in": 3600
    }))
}

// DFS-style listing: unsorted, with a directory entry, a nested PDF, and a
// non-PDF file mixed in.
async fn list_endpoint() -> Json<Value> {
    Json(json!({
        "paths": [
            { "name": "Reports.Lakehouse/Files/quarterly-report.pdf" },
            { "name": "Reports.Lakehouse/Files/notes.txt" },
            { "name": "Reports.Lakehouse/Files/archive", "isDirectory": "true" },
            { "name": "Reports.Lakehouse/Files/archive/old.PDF" },
            { "name": "Reports.Lakehouse/Files/alpha.pdf" }
        ]
    }))
}

async fn read_endpoint(Path(path): Path<String>) -> Response {
    match stored_file(&path) {
        Some(bytes) => bytes.to_vec().into_response(),
        None => (StatusCode::NOT_FOUND, "path not found").into_response(),
    }
}

async fn failing_endpoint() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock OneLake listener");
    let addr = listener.local_addr().expect("mock OneLake local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock OneLake");
    });

    addr
}

/// Stand-in for the OneLake DFS endpoint plus the Entra ID token endpoint,
/// bound to an ephemeral local port.
async fn spawn_mock_onelake() -> SocketAddr {
    spawn(
        Router::new()
            .route("/test-tenant/oauth2/v2.0/token", post(token_endpoint))
            .route("/test-workspace", get(list_endpoint))
            .route("/test-workspace/*path", get(read_endpoint)),
    )
    .await
}

/// Mock whose storage surface is down: token exchange works, every DFS call
/// answers 500.
async fn spawn_broken_onelake() -> SocketAddr {
    spawn(
        Router::new()
            .route("/test-tenant/oauth2/v2.0/token", post(token_endpoint))
            .route("/test-workspace", get(failing_endpoint))
            .route("/test-workspace/*path", get(failing_endpoint)),
    )
    .await
}

fn test_config(base_url: String, folder: &str) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tenant_id: "test-tenant".to_string(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        workspace_name: "test-workspace".to_string(),
        lakehouse_name: "Reports".to_string(),
        onelake_dfs_url: base_url.clone(),
        authority_url: base_url,
        pdf_folder_path: folder.to_string(),
        cors_origins: vec![TEST_ORIGIN.to_string()],
        api_key: TEST_API_KEY.to_string(),
        request_timeout_seconds: 5,
    })
}

fn build_app(addr: SocketAddr, folder: &str) -> Router {
    let config = test_config(format!("http://{}", addr), folder);
    let storage = OneLakeService::new(config.clone()).expect("create OneLake service");

    app_router(AppState {
        config,
        storage: Arc::new(storage),
    })
}

/// Setup a test application wired against a fresh mock OneLake instance.
pub async fn setup_test_app() -> Router {
    let addr = spawn_mock_onelake().await;
    build_app(addr, "Files")
}

/// Same as `setup_test_app`, but scoped to a different Lakehouse folder.
pub async fn setup_test_app_with_folder(folder: &str) -> Router {
    let addr = spawn_mock_onelake().await;
    build_app(addr, folder)
}

/// Test application whose storage backend rejects every DFS call.
pub async fn setup_test_app_with_broken_backend() -> Router {
    let addr = spawn_broken_onelake().await;
    build_app(addr, "Files")
}
