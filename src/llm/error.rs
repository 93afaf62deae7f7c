use std::time::Duration;

use thiserror::Error;

use crate::core::error::WorkerError;

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Rate limited by provider: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LLMError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LLMError::RateLimited { .. })
    }
}

/// Throttling becomes the runner's retry signal; everything else is fatal.
impl From<LLMError> for WorkerError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::RateLimited {
                message,
                retry_after,
            } => WorkerError::RateLimited {
                message,
                retry_after,
            },
            other => WorkerError::failed(other),
        }
    }
}
