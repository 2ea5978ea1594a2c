use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use regex::Regex;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::models::errors::AppError;
use crate::utils::config::AppConfig;

/// Everything OneLake exposes through the ADLS Gen2 (DFS) REST surface.
const DFS_API_VERSION: &str = "2023-11-03";

/// Bearer tokens are refreshed this long before their reported expiry.
const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(30);

fn safe_filename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_. -]{0,253}(?i:\.pdf)$")
            .expect("safe filename regex is valid")
    })
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct PathList {
    #[serde(default)]
    paths: Vec<PathEntry>,
}

#[derive(Debug, Deserialize)]
struct PathEntry {
    name: String,
    // The DFS API encodes this flag as the string "true", not a boolean.
    #[serde(rename = "isDirectory", default)]
    is_directory: Option<String>,
}

impl PathEntry {
    fn is_dir(&self) -> bool {
        self.is_directory.as_deref() == Some("true")
    }
}

/// Encapsulates all interaction with OneLake / ADLS Gen2, scoped to one
/// workspace and one Lakehouse folder.
///
/// The service principal's bearer token is acquired lazily on first use and
/// cached behind a mutex, so concurrent first requests cannot race a duplicate
/// token exchange. It lives for the lifetime of the process.
#[derive(Debug)]
pub struct OneLakeService {
    config: Arc<AppConfig>,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl OneLakeService {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::backend_unavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    /// Validate that a filename is safe to use as a storage path segment.
    ///
    /// Rules:
    /// - no ".." component and no path separators
    /// - starts with an alphanumeric, dash, or underscore
    /// - only alphanumerics, dashes, underscores, dots, and spaces
    /// - ends with ".pdf" (any case, matching the listing filter)
    pub fn validate_filename(filename: &str) -> bool {
        if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
            return false;
        }
        safe_filename_re().is_match(filename)
    }

    /// OneLake filesystem (container) name: the Fabric workspace.
    fn file_system_name(&self) -> &str {
        &self.config.workspace_name
    }

    /// Directory path inside the filesystem: `<Lakehouse>.Lakehouse/<folder>`.
    fn directory_path(&self) -> String {
        format!(
            "{}.Lakehouse/{}",
            self.config.lakehouse_name, self.config.pdf_folder_path
        )
    }

    /// Directory path with each segment percent-encoded, for use in URL
    /// paths. Separators stay literal so the DFS hierarchy is preserved.
    fn encoded_directory_path(&self) -> String {
        self.directory_path()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Return the cached bearer token, exchanging client credentials for a
    /// fresh one if none is cached or the cached one is about to expire.
    async fn bearer_token(&self) -> Result<String, AppError> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.value.clone());
            }
        }

        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.config.authority_url, self.config.tenant_id
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", "https://storage.azure.com/.default"),
        ];

        let response = self
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AppError::backend_unavailable(format!("Token request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::backend_unavailable(format!(
                "Token request rejected with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::backend_unavailable(format!("Malformed token response: {}", e))
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_SKEW);
        *guard = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        tracing::debug!("Acquired OneLake bearer token (lifetime {:?})", lifetime);

        Ok(token.access_token)
    }

    /// Return the names of all PDF files in the configured OneLake folder,
    /// sorted ascending.
    pub async fn list_pdf_files(&self) -> Result<Vec<String>, AppError> {
        let token = self.bearer_token().await?;

        let url = format!(
            "{}/{}?resource=filesystem&recursive=true&directory={}",
            self.config.onelake_dfs_url,
            self.file_system_name(),
            urlencoding::encode(&self.directory_path()),
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header("x-ms-version", DFS_API_VERSION)
            .send()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("Listing request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::backend_unavailable(format!(
                "Listing rejected with status {}",
                response.status()
            )));
        }

        let listing: PathList = response.json().await.map_err(|e| {
            AppError::backend_unavailable(format!("Malformed listing response: {}", e))
        })?;

        let mut pdf_files: Vec<String> = listing
            .paths
            .iter()
            .filter(|entry| !entry.is_dir())
            .filter_map(|entry| entry.name.rsplit('/').next())
            .filter(|name| name.to_lowercase().ends_with(".pdf"))
            .map(|name| name.to_string())
            .collect();
        pdf_files.sort();

        tracing::info!("Listed {} PDF(s) from OneLake", pdf_files.len());
        Ok(pdf_files)
    }

    /// Download a single PDF from OneLake, fully buffered.
    ///
    /// Fails with `InvalidFilename` before any remote call if the name is
    /// unsafe; any remote failure collapses to `NotFound` (the caller is not
    /// told whether the file is missing or the backend denied access).
    pub async fn download_pdf(&self, filename: &str) -> Result<Vec<u8>, AppError> {
        if !Self::validate_filename(filename) {
            return Err(AppError::invalid_filename(filename.to_string()));
        }

        match self.fetch_file(filename).await {
            Ok(bytes) => {
                tracing::info!("Downloaded '{}' ({} bytes)", filename, bytes.len());
                Ok(bytes)
            }
            Err(e) => {
                tracing::error!("Failed to download '{}': {}", filename, e);
                Err(AppError::not_found(filename.to_string()))
            }
        }
    }

    async fn fetch_file(&self, filename: &str) -> Result<Vec<u8>, AppError> {
        let token = self.bearer_token().await?;

        let url = format!(
            "{}/{}/{}/{}",
            self.config.onelake_dfs_url,
            self.file_system_name(),
            self.encoded_directory_path(),
            urlencoding::encode(filename),
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header("x-ms-version", DFS_API_VERSION)
            .send()
            .await
            .map_err(|e| AppError::backend_unavailable(format!("Read request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::backend_unavailable(format!(
                "Read rejected with status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::backend_unavailable(format!("Failed to read response body: {}", e))
        })?;

        Ok(bytes.to_vec())
    }
}
