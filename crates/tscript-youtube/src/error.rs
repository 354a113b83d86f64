//! Error types for YouTube data access.

use std::time::Duration;
use thiserror::Error;

/// Result type for YouTube operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Errors raised by the listing retriever and transcript sources.
///
/// Inside the resolver every variant means "this source cannot serve this
/// video" and triggers fallback to the next source.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Embedded data not found: {0}")]
    MissingData(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No captions available: {0}")]
    NoCaptions(String),

    #[error("Source timed out after {0:?}")]
    Timeout(Duration),
}

impl YoutubeError {
    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn no_captions(msg: impl Into<String>) -> Self {
        Self::NoCaptions(msg.into())
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            YoutubeError::Http(_) => "http",
            YoutubeError::Status { .. } => "status",
            YoutubeError::MissingData(_) => "missing_data",
            YoutubeError::Parse(_) | YoutubeError::Json(_) => "parse",
            YoutubeError::NoCaptions(_) => "no_captions",
            YoutubeError::Timeout(_) => "timeout",
        }
    }
}
