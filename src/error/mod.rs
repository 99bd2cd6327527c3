// Error types for the fluxcache router
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Install failed: {0}")]
    Install(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// True when the failure came from the network leg rather than the cache.
    pub fn is_network(&self) -> bool {
        matches!(self, RouterError::Network(_) | RouterError::Http(_))
    }
}

// Convert RouterError to HTTP responses for Axum
impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            RouterError::Network(_) | RouterError::Http(_) => {
                (StatusCode::BAD_GATEWAY, "network_error")
            }
            RouterError::InvalidRequest(_) | RouterError::Json(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            RouterError::Config(_) | RouterError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            RouterError::Install(_) => (StatusCode::SERVICE_UNAVAILABLE, "install_error"),
            RouterError::Cache(_) => (StatusCode::INTERNAL_SERVER_ERROR, "cache_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
