//! Worker error types.

use std::time::Duration;

use thiserror::Error;
use tscript_models::RequestError;
use tscript_youtube::YoutubeError;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Failures that end a pipeline run early.
///
/// Display text is written for the person who started the run.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("GEMINI_API_KEY is not set. Add it to the environment or a .env file.")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("Failed to fetch search results: {0}")]
    Listing(#[from] YoutubeError),

    #[error("No videos matched the search")]
    NoVideos,

    #[error("Pipeline deadline of {limit:?} exceeded during {stage}")]
    Deadline {
        limit: Duration,
        stage: &'static str,
    },
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn deadline(limit: Duration, stage: &'static str) -> Self {
        Self::Deadline { limit, stage }
    }

    /// Whether the run stopped before any network work.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            WorkerError::MissingApiKey | WorkerError::InvalidRequest(_) | WorkerError::ConfigError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert!(WorkerError::MissingApiKey
            .to_string()
            .contains("GEMINI_API_KEY"));
        assert_eq!(
            WorkerError::from(RequestError::EmptyKeyword).to_string(),
            "Invalid request: Keyword must not be empty"
        );
        assert!(WorkerError::deadline(Duration::from_secs(300), "transcript fetching")
            .to_string()
            .contains("transcript fetching"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(WorkerError::MissingApiKey.is_precondition());
        assert!(WorkerError::config_error("bad").is_precondition());
        assert!(!WorkerError::NoVideos.is_precondition());
    }
}
