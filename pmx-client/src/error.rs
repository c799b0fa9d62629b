//! Client error types

use thiserror::Error;

/// Backend client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out waiting for task {0}")]
    TaskTimeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::ParseError(e.to_string())
        } else {
            ClientError::NetworkError(e.to_string())
        }
    }
}

impl From<pmx_common::Error> for ClientError {
    fn from(e: pmx_common::Error) -> Self {
        match e {
            pmx_common::Error::Config(msg) => ClientError::Config(msg),
            pmx_common::Error::InvalidInput(msg) => ClientError::Validation(msg),
            pmx_common::Error::NotFound(msg) => ClientError::NotFound(msg),
            pmx_common::Error::Io(e) => ClientError::Io(e),
            other => ClientError::ParseError(other.to_string()),
        }
    }
}
