//! Caption tracks from the InnerTube player endpoint.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{fetch_track_text, TranscriptSource};
use crate::captions::{caption_tracks, select_track};
use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};

const PLAYER_PATH: &str = "/youtubei/v1/player?prettyPrint=false";
const ANDROID_CLIENT_VERSION: &str = "20.10.38";

/// Structured transcript API: the InnerTube player endpoint's caption list.
///
/// Strict about language: only the preferred languages are accepted.
#[derive(Debug, Clone)]
pub struct PlayerApiSource {
    client: YoutubeClient,
}

impl PlayerApiSource {
    pub fn new(client: YoutubeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptSource for PlayerApiSource {
    fn name(&self) -> &'static str {
        "player_api"
    }

    async fn attempt(&self, video_id: &str) -> YoutubeResult<String> {
        let config = self.client.config();
        let body = json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": ANDROID_CLIENT_VERSION,
                    "hl": config.interface_language,
                }
            },
            "videoId": video_id
        });

        let response = self.client.post_json(PLAYER_PATH, &body).await?;
        let tracks = caption_tracks(&response);
        let track = select_track(&tracks, &config.preferred_languages, false).ok_or_else(|| {
            YoutubeError::no_captions(format!(
                "no {} track among {} listed",
                config.preferred_languages.join("/"),
                tracks.len()
            ))
        })?;

        debug!(video_id, language = %track.language_code, "Player API caption track selected");
        fetch_track_text(&self.client, track).await
    }
}
