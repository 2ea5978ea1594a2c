use std::env;

use crate::models::errors::AppError;

/// Application settings, sourced from environment variables at startup.
///
/// Loaded once in `main` and shared read-only behind an `Arc` afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Entra ID service principal used against the OneLake DFS endpoint
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,

    // Microsoft Fabric workspace / Lakehouse holding the PDFs
    pub workspace_name: String,
    pub lakehouse_name: String,
    pub onelake_dfs_url: String,
    pub authority_url: String,
    pub pdf_folder_path: String,

    pub cors_origins: Vec<String>,
    pub api_key: String,
    pub request_timeout_seconds: u64,
}

impl AppConfig {
    /// Build the configuration from the environment.
    ///
    /// Credentials and workspace identifiers have no sensible defaults and
    /// must be present; everything else falls back to a local-dev default.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            tenant_id: required_var("TENANT_ID")?,
            client_id: required_var("CLIENT_ID")?,
            client_secret: required_var("CLIENT_SECRET")?,
            workspace_name: required_var("WORKSPACE_NAME")?,
            lakehouse_name: required_var("LAKEHOUSE_NAME")?,
            onelake_dfs_url: "https://onelake.dfs.fabric.microsoft.com".to_string(),
            authority_url: "https://login.microsoftonline.com".to_string(),
            pdf_folder_path: "Files".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            api_key: "changeme-in-production".to_string(),
            request_timeout_seconds: 30,
        };

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }

        if let Ok(url) = env::var("ONELAKE_DFS_URL") {
            config.onelake_dfs_url = url;
        }

        if let Ok(url) = env::var("AUTHORITY_URL") {
            config.authority_url = url;
        }

        if let Ok(folder) = env::var("PDF_FOLDER_PATH") {
            config.pdf_folder_path = folder;
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(key) = env::var("API_KEY") {
            config.api_key = key;
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(timeout_num) = timeout.parse::<u64>() {
                config.request_timeout_seconds = timeout_num;
            }
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required_var(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| {
        AppError::config_failed(format!("Missing required environment variable: {}", name))
    })
}
