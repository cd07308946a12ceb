//! Text-generation error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Debug, Error)]
pub enum LlmError {
    /// Credential or provider configuration is absent
    #[error("Generation unavailable: {0}")]
    Unavailable(String),

    /// The call succeeded but carried no text content
    #[error("Generation returned no content")]
    Empty,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Check if this is a configuration problem rather than a call failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LlmError::Unavailable(_))
    }

    /// Check if this error came from the transport or protocol layer
    ///
    /// Everything except `Unavailable` and `Empty` counts as a failed call.
    pub fn is_call_failure(&self) -> bool {
        !matches!(self, LlmError::Unavailable(_) | LlmError::Empty)
    }
}
