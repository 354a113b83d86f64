//! Video ID helpers shared by the listing parser and the CLI.

use thiserror::Error;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    #[error("Video ID has invalid format")]
    InvalidVideoId,

    #[error("Video ID not found in input")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Check that a string looks like an 11-character YouTube video ID.
pub fn is_valid_youtube_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract a video ID from a watch URL, short URL, shorts URL or a bare ID.
///
/// Supported inputs:
/// - `https://www.youtube.com/watch?v=VIDEO_ID&t=10`
/// - `/watch?v=VIDEO_ID` (listing-relative links)
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/shorts/VIDEO_ID`
/// - `VIDEO_ID`
pub fn extract_youtube_id(input: &str) -> YoutubeIdResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(YoutubeIdError::VideoIdNotFound);
    }

    let candidate = if let Some(pos) = input.find("v=") {
        id_segment(&input[pos + 2..])
    } else if let Some(pos) = input.find("youtu.be/") {
        id_segment(&input[pos + 9..])
    } else if let Some(pos) = input.find("/shorts/") {
        id_segment(&input[pos + 8..])
    } else if input.contains('/') {
        return Err(YoutubeIdError::VideoIdNotFound);
    } else {
        input
    };

    if is_valid_youtube_id(candidate) {
        Ok(candidate.to_string())
    } else {
        Err(YoutubeIdError::InvalidVideoId)
    }
}

fn id_segment(segment: &str) -> &str {
    let end = segment
        .find(|c| matches!(c, '&' | '#' | '?' | '/'))
        .unwrap_or(segment.len());
    &segment[..end]
}
