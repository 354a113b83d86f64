//! Shared data models for the TrendScript pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their transcript state
//! - Search requests and listing filters
//! - View-count parsing and magnitude formatting

pub mod request;
pub mod utils;
pub mod video;
pub mod views;

// Re-export common types
pub use request::{LengthFilter, RequestError, SearchRequest, SortBy, UploadDateFilter};
pub use utils::{extract_youtube_id, is_valid_youtube_id, YoutubeIdError, YoutubeIdResult};
pub use video::{TranscriptState, VideoRecord, FETCH_FAILED_LABEL, UNAVAILABLE_LABEL};
pub use views::{estimate_likes, format_magnitude, parse_views, LIKES_ESTIMATE_RATIO};
