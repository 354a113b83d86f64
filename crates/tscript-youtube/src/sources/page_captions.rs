//! Caption tracks embedded in the watch page.

use async_trait::async_trait;
use tracing::debug;

use super::{fetch_track_text, TranscriptSource};
use crate::captions::{caption_tracks, select_track};
use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};
use crate::json::extract_embedded_json;

/// Caption metadata embedded in the watch page as `ytInitialPlayerResponse`.
///
/// Lenient about language: falls back to the first listed track.
#[derive(Debug, Clone)]
pub struct PageCaptionSource {
    client: YoutubeClient,
}

impl PageCaptionSource {
    pub fn new(client: YoutubeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for PageCaptionSource {
    fn name(&self) -> &'static str {
        "page_captions"
    }

    async fn attempt(&self, video_id: &str) -> YoutubeResult<String> {
        let html = self
            .client
            .get_text(&format!("/watch?v={}", urlencoding::encode(video_id)))
            .await?;
        let player_response = extract_embedded_json(&html, "ytInitialPlayerResponse")?;

        let tracks = caption_tracks(&player_response);
        let track = select_track(&tracks, &self.client.config().preferred_languages, true)
            .ok_or_else(|| YoutubeError::no_captions("watch page lists no caption tracks"))?;

        debug!(video_id, language = %track.language_code, "Page caption track selected");
        fetch_track_text(&self.client, track).await
    }
}
