use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid filename: {message}")]
    InvalidFilename { message: String },

    #[error("File not found: {message}")]
    NotFound { message: String },

    #[error("Storage backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

// Convenience constructors for creating specific errors
impl AppError {
    pub fn invalid_filename(message: impl Into<String>) -> Self {
        AppError::InvalidFilename { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound { message: message.into() }
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        AppError::BackendUnavailable { message: message.into() }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        AppError::Unauthenticated { message: message.into() }
    }

    pub fn config_failed(message: impl Into<String>) -> Self {
        AppError::ConfigError { message: message.into() }
    }
}
