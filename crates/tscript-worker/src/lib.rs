//! Trending-video script pipeline.
//!
//! This crate provides:
//! - Metadata extraction from search listings
//! - Parallel transcript fetching with per-task timeouts
//! - Ranking and prompt budgeting
//! - Gemini generation with quota-aware retry and fallback
//! - The pipeline orchestrator behind the `trendscript` binary

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod gemini;
pub mod generation;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod ranking;
pub mod retry;
pub mod synthesizer;

pub use config::PipelineConfig;
pub use error::{WorkerError, WorkerResult};
pub use extractor::{extract_records, MAX_VIDEOS};
pub use fetcher::TranscriptFetcher;
pub use gemini::{GeminiBackend, GenerationBackend};
pub use generation::{
    error_message, fallback_script, GeneratedScript, GenerationClient, GenerationConfig,
    GenerationError, GenerationOutcome, ScriptKind,
};
pub use pipeline::{select_sources, Pipeline, PipelineOutput};
pub use prompt::{build_fallback_prompt, build_prompt, truncate_words, PromptBudget, SourceTranscript};
pub use ranking::rank_videos;
pub use retry::{GenerationAttempt, RetryPolicy};
pub use synthesizer::ScriptSynthesizer;
