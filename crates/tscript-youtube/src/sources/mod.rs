//! Transcript sources.
//!
//! Each source answers one question: can it produce transcript text for this
//! video id? Any error means "not from here" and the resolver moves on.

use async_trait::async_trait;

use crate::captions::{parse_timedtext, segments_to_text, CaptionTrack};
use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};

mod page_captions;
mod panel;
mod player_api;

pub use page_captions::PageCaptionSource;
pub use panel::TranscriptPanelSource;
pub use player_api::PlayerApiSource;

/// A strategy for obtaining a video's transcript.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether the returned text carries `[MM:SS]` markers.
    fn timestamped(&self) -> bool {
        false
    }

    async fn attempt(&self, video_id: &str) -> YoutubeResult<String>;
}

/// Download a caption track and flatten it to plain text.
pub(crate) async fn fetch_track_text(
    client: &YoutubeClient,
    track: &CaptionTrack,
) -> YoutubeResult<String> {
    // srv3 is the format-3 variant; the classic form is simpler to parse
    let url = track.base_url.replace("&fmt=srv3", "");
    let xml = client.get_text(&url).await?;
    let segments = parse_timedtext(&xml)?;

    if segments.is_empty() {
        return Err(YoutubeError::no_captions(format!(
            "track {} is empty",
            track.language_code
        )));
    }

    Ok(segments_to_text(&segments))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::client::{YoutubeClient, YoutubeConfig};
    use wiremock::MockServer;

    pub fn client_for(server: &MockServer) -> YoutubeClient {
        YoutubeClient::new(YoutubeConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    pub fn timedtext(lines: &[&str]) -> String {
        let body: String = lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!(r#"<text start="{i}.0" dur="1.0">{line}</text>"#))
            .collect();
        format!(r#"<?xml version="1.0" encoding="utf-8" ?><transcript>{body}</transcript>"#)
    }
}
