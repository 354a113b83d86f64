//! Pipeline configuration.

use std::fmt;
use std::time::Duration;

use tracing::warn;
use tscript_youtube::YoutubeConfig;

use crate::error::{WorkerError, WorkerResult};
use crate::retry::RetryPolicy;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Pipeline configuration, built once at start-up.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Gemini API key; required before any network work
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub youtube_base_url: String,
    /// Maximum concurrent transcript resolutions
    pub max_concurrent_transcripts: usize,
    /// Timeout for one video's whole resolution
    ///
    /// Bounds the whole source chain, so sources late in the chain only run
    /// when earlier ones finish before their own `source_timeout`.
    pub transcript_task_timeout: Duration,
    /// Timeout for one source attempt
    pub source_timeout: Duration,
    /// Adds the transcript panel as a third source
    pub enable_panel_source: bool,
    /// Bound on the whole run
    pub pipeline_deadline: Duration,
    /// Maximum records kept from the listing
    pub max_videos: usize,
    /// Transcripts fed into the prompt
    pub prompt_videos: usize,
    /// Natural language of the generated script
    pub output_language: String,
    pub retry_base_delay: Duration,
    pub retry_max_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            youtube_base_url: "https://www.youtube.com".to_string(),
            max_concurrent_transcripts: 5,
            transcript_task_timeout: Duration::from_secs(15),
            source_timeout: Duration::from_secs(5),
            enable_panel_source: false,
            pipeline_deadline: Duration::from_secs(300), // 5 minutes
            max_videos: 10,
            prompt_videos: 3,
            output_language: "Japanese".to_string(),
            retry_base_delay: Duration::from_secs(2),
            retry_max_attempts: 5,
        }
    }
}

// Keeps the API key out of logs
impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<set>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("max_concurrent_transcripts", &self.max_concurrent_transcripts)
            .field("transcript_task_timeout", &self.transcript_task_timeout)
            .field("source_timeout", &self.source_timeout)
            .field("enable_panel_source", &self.enable_panel_source)
            .field("pipeline_deadline", &self.pipeline_deadline)
            .field("max_videos", &self.max_videos)
            .field("prompt_videos", &self.prompt_videos)
            .field("output_language", &self.output_language)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .finish()
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            youtube_base_url: std::env::var("YOUTUBE_BASE_URL")
                .unwrap_or(defaults.youtube_base_url),
            max_concurrent_transcripts: std::env::var("TSCRIPT_MAX_CONCURRENT_TRANSCRIPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            transcript_task_timeout: Duration::from_secs(
                std::env::var("TSCRIPT_TRANSCRIPT_TASK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            source_timeout: Duration::from_secs(
                std::env::var("TSCRIPT_SOURCE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            enable_panel_source: std::env::var("TSCRIPT_ENABLE_PANEL_SOURCE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            pipeline_deadline: Duration::from_secs(
                std::env::var("TSCRIPT_PIPELINE_DEADLINE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_videos: defaults.max_videos,
            prompt_videos: std::env::var("TSCRIPT_PROMPT_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            output_language: std::env::var("TSCRIPT_OUTPUT_LANGUAGE")
                .unwrap_or(defaults.output_language),
            retry_base_delay: Duration::from_millis(
                std::env::var("TSCRIPT_RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            retry_max_attempts: std::env::var("TSCRIPT_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.max_concurrent_transcripts == 0 {
            return Err(WorkerError::config_error(
                "TSCRIPT_MAX_CONCURRENT_TRANSCRIPTS must be at least 1",
            ));
        }
        if self.retry_max_attempts == 0 {
            return Err(WorkerError::config_error(
                "TSCRIPT_RETRY_MAX_ATTEMPTS must be at least 1",
            ));
        }
        if self.prompt_videos == 0 {
            return Err(WorkerError::config_error("TSCRIPT_PROMPT_VIDEOS must be at least 1"));
        }
        if !self.source_chain_fits() {
            warn!(
                sources = self.source_count(),
                source_timeout_secs = self.source_timeout.as_secs_f64(),
                task_timeout_secs = self.transcript_task_timeout.as_secs_f64(),
                "Source chain can outlast the per-video timeout; the last source may never run"
            );
        }
        Ok(())
    }

    /// Number of transcript sources in the chain.
    pub fn source_count(&self) -> u32 {
        if self.enable_panel_source {
            3
        } else {
            2
        }
    }

    /// Whether every source can use its full timeout inside the per-video one.
    pub fn source_chain_fits(&self) -> bool {
        self.source_timeout * self.source_count() < self.transcript_task_timeout
    }

    /// The API key, or the user-facing missing-key error.
    pub fn require_api_key(&self) -> WorkerResult<&str> {
        self.gemini_api_key
            .as_deref()
            .ok_or(WorkerError::MissingApiKey)
    }

    /// Settings for the YouTube client and transcript sources.
    pub fn youtube_config(&self) -> YoutubeConfig {
        YoutubeConfig {
            base_url: self.youtube_base_url.clone(),
            source_timeout: self.source_timeout,
            enable_panel_source: self.enable_panel_source,
            ..Default::default()
        }
    }

    /// Retry policy for generation calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new("gemini_generate")
            .with_max_attempts(self.retry_max_attempts)
            .with_base_delay(self.retry_base_delay)
    }
}
