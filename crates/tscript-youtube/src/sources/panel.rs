//! Segments from the watch page's transcript panel.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::TranscriptSource;
use crate::captions::format_timestamp;
use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};
use crate::json::{collect_key, extract_embedded_json, find_key, text_of};

const GET_TRANSCRIPT_PATH: &str = "/youtubei/v1/get_transcript?prettyPrint=false";
const WEB_CLIENT_VERSION: &str = "2.20241126.01.00";

/// The data behind the watch page's "Show transcript" panel.
///
/// Produces one `[MM:SS] text` line per segment.
#[derive(Debug, Clone)]
pub struct TranscriptPanelSource {
    client: YoutubeClient,
}

impl TranscriptPanelSource {
    pub fn new(client: YoutubeClient) -> Self {
        Self { client }
    }

    async fn panel_params(&self, video_id: &str) -> YoutubeResult<String> {
        let html = self
            .client
            .get_text(&format!("/watch?v={}", urlencoding::encode(video_id)))
            .await?;
        let data = extract_embedded_json(&html, "ytInitialData")?;

        find_key(&data, "getTranscriptEndpoint")
            .and_then(|endpoint| endpoint.get("params"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| YoutubeError::no_captions("watch page has no transcript panel"))
    }
}

/// Render panel segments as `[MM:SS] text` lines.
fn render_segments(response: &Value) -> Vec<String> {
    let mut renderers = Vec::new();
    collect_key(response, "transcriptSegmentRenderer", &mut renderers);

    renderers
        .into_iter()
        .filter_map(|segment| {
            let text = segment.get("snippet").and_then(text_of)?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            let start_ms = segment
                .get("startMs")
                .and_then(|ms| match ms {
                    Value::String(s) => s.parse::<f64>().ok(),
                    other => other.as_f64(),
                })
                .unwrap_or(0.0);
            Some(format!("[{}] {}", format_timestamp(start_ms / 1000.0), text))
        })
        .collect()
}

#[async_trait]
impl TranscriptSource for TranscriptPanelSource {
    fn name(&self) -> &'static str {
        "transcript_panel"
    }

    fn timestamped(&self) -> bool {
        true
    }

    async fn attempt(&self, video_id: &str) -> YoutubeResult<String> {
        let params = self.panel_params(video_id).await?;

        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": WEB_CLIENT_VERSION,
                    "hl": self.client.config().interface_language,
                }
            },
            "params": params
        });
        let response = self.client.post_json(GET_TRANSCRIPT_PATH, &body).await?;

        let lines = render_segments(&response);
        if lines.is_empty() {
            return Err(YoutubeError::no_captions("transcript panel is empty"));
        }

        debug!(video_id, segments = lines.len(), "Transcript panel resolved");
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_support::client_for;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn panel_response() -> Value {
        json!({"actions": [{"updateEngagementPanelAction": {"content": {"transcriptRenderer": {
            "content": {"transcriptSearchPanelRenderer": {"body": {"transcriptSegmentListRenderer": {
                "initialSegments": [
                    {"transcriptSegmentRenderer": {"startMs": "0", "snippet": {"runs": [{"text": "Intro"}]}}},
                    {"transcriptSegmentRenderer": {"startMs": "95500", "snippet": {"simpleText": "Main point"}}},
                    {"transcriptSectionHeaderRenderer": {"startMs": "96000"}}
                ]
            }}}}
        }}}}]})
    }

    #[test]
    fn test_render_segments() {
        assert_eq!(
            render_segments(&panel_response()),
            vec!["[00:00] Intro".to_string(), "[01:35] Main point".to_string()]
        );
    }

    #[tokio::test]
    async fn test_panel_source() {
        let server = MockServer::start().await;
        let watch = r#"<script>var ytInitialData = {"engagementPanels": [{"continuationItemRenderer": {"continuationEndpoint": {"getTranscriptEndpoint": {"params": "CgtQQU5FTA"}}}}]};</script>"#;

        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(watch))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/youtubei/v1/get_transcript"))
            .and(body_partial_json(json!({"params": "CgtQQU5FTA"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(panel_response()))
            .expect(1)
            .mount(&server)
            .await;

        let source = TranscriptPanelSource::new(client_for(&server));
        assert!(source.timestamped());
        let text = source.attempt("vid00000003").await.unwrap();
        assert_eq!(text, "[00:00] Intro\n[01:35] Main point");
    }

    #[tokio::test]
    async fn test_panel_source_without_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<script>var ytInitialData = {};</script>"),
            )
            .mount(&server)
            .await;

        let source = TranscriptPanelSource::new(client_for(&server));
        let err = source.attempt("vid00000003").await.unwrap_err();
        assert!(matches!(err, YoutubeError::NoCaptions(_)));
    }
}
