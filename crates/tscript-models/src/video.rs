//! Video record models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown when no transcript source could serve a video.
pub const UNAVAILABLE_LABEL: &str = "Transcript not available for this video";

/// Label shown when the transcript task itself failed or timed out.
pub const FETCH_FAILED_LABEL: &str = "Transcript fetch failed";

/// Transcript attached to a video record.
///
/// `Unavailable` and `FetchFailed` are distinct sentinels: the first means every
/// source was tried and none had captions, the second means the task errored
/// or ran out of time before the resolver could answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum TranscriptState {
    /// Not fetched yet
    #[default]
    Pending,
    /// Transcript text resolved by one of the sources
    Text(String),
    /// Resolver returned nothing
    Unavailable,
    /// Task failed or timed out
    FetchFailed,
}

impl TranscriptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptState::Pending => "pending",
            TranscriptState::Text(_) => "text",
            TranscriptState::Unavailable => "unavailable",
            TranscriptState::FetchFailed => "fetch_failed",
        }
    }

    /// Resolved transcript text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            TranscriptState::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, TranscriptState::Unavailable)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TranscriptState::Pending)
    }

    /// Text to render for this state: the transcript itself or a sentinel label.
    pub fn display_text(&self) -> &str {
        match self {
            TranscriptState::Text(text) => text,
            TranscriptState::Unavailable => UNAVAILABLE_LABEL,
            TranscriptState::FetchFailed => FETCH_FAILED_LABEL,
            TranscriptState::Pending => "",
        }
    }
}

impl fmt::Display for TranscriptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One video from a search listing, enriched with its transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform-assigned video ID, unique within a batch
    pub video_id: String,

    /// Video title
    pub title: String,

    /// Channel name (empty when the listing omitted it)
    #[serde(default)]
    pub channel: String,

    /// Thumbnail URL
    pub thumbnail_url: String,

    /// View count as displayed by the listing, e.g. "12万回視聴"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views_raw: Option<String>,

    /// Parsed view count, 0 when `views_raw` is absent or unparseable
    #[serde(default)]
    pub views_numeric: f64,

    /// Relative publish date as displayed, e.g. "3日前"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date_raw: Option<String>,

    /// Estimated like count. This is a heuristic derived from views
    /// (see [`crate::views::LIKES_ESTIMATE_RATIO`]), not a scraped metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_likes: Option<String>,

    /// Transcript state
    #[serde(default)]
    pub transcript: TranscriptState,
}

impl VideoRecord {
    /// Create a record with required fields and no optional metadata.
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel: String::new(),
            thumbnail_url: thumbnail_url.into(),
            views_raw: None,
            views_numeric: 0.0,
            publish_date_raw: None,
            estimated_likes: None,
            transcript: TranscriptState::Pending,
        }
    }

    /// Attach the transcript outcome, consuming the pending record.
    pub fn with_transcript(mut self, transcript: TranscriptState) -> Self {
        debug_assert!(self.transcript.is_pending(), "transcript attached twice");
        self.transcript = transcript;
        self
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_pending() {
        let record = VideoRecord::new("abc123def45", "Title", "https://i.ytimg.com/x.jpg");
        assert!(record.transcript.is_pending());
        assert_eq!(record.views_numeric, 0.0);
        assert!(record.views_raw.is_none());
        assert_eq!(record.watch_url(), "https://www.youtube.com/watch?v=abc123def45");
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(TranscriptState::Unavailable, TranscriptState::FetchFailed);
        assert_eq!(TranscriptState::Unavailable.display_text(), UNAVAILABLE_LABEL);
        assert_eq!(TranscriptState::FetchFailed.display_text(), FETCH_FAILED_LABEL);
        assert!(TranscriptState::Unavailable.text().is_none());
        assert_eq!(TranscriptState::Text("hi".into()).text(), Some("hi"));
    }

    #[test]
    fn test_transcript_state_serialization() {
        let json = serde_json::to_value(TranscriptState::Text("hello".into())).unwrap();
        assert_eq!(json["status"], "text");
        assert_eq!(json["text"], "hello");

        let json = serde_json::to_value(TranscriptState::FetchFailed).unwrap();
        assert_eq!(json["status"], "fetch_failed");
    }
}
