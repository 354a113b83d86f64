//! Transcript resolution across an ordered chain of sources.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::captions::strip_timestamps;
use crate::client::YoutubeClient;
use crate::error::{YoutubeError, YoutubeResult};
use crate::sources::{PageCaptionSource, PlayerApiSource, TranscriptPanelSource, TranscriptSource};

/// Tries transcript sources in priority order and returns the first success.
///
/// Never fails: a video that no source can serve resolves to `None`.
#[derive(Clone)]
pub struct TranscriptResolver {
    sources: Vec<Arc<dyn TranscriptSource>>,
    standalone: Option<Arc<dyn TranscriptSource>>,
    source_timeout: Duration,
}

impl TranscriptResolver {
    pub fn new(sources: Vec<Arc<dyn TranscriptSource>>, source_timeout: Duration) -> Self {
        Self {
            sources,
            standalone: None,
            source_timeout,
        }
    }

    /// Source tried first by [`resolve_standalone`](Self::resolve_standalone).
    pub fn with_standalone_source(mut self, source: Arc<dyn TranscriptSource>) -> Self {
        self.standalone = Some(source);
        self
    }

    /// Default chain: player API, then watch-page captions, then the transcript
    /// panel when enabled. The panel always backs standalone lookups.
    pub fn from_client(client: YoutubeClient) -> Self {
        let config = client.config().clone();
        let panel: Arc<dyn TranscriptSource> = Arc::new(TranscriptPanelSource::new(client.clone()));

        let mut sources: Vec<Arc<dyn TranscriptSource>> = vec![
            Arc::new(PlayerApiSource::new(client.clone())),
            Arc::new(PageCaptionSource::new(client)),
        ];
        if config.enable_panel_source {
            sources.push(panel.clone());
        }

        Self::new(sources, config.source_timeout).with_standalone_source(panel)
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    async fn attempt(&self, source: &dyn TranscriptSource, video_id: &str) -> YoutubeResult<String> {
        let text = tokio::time::timeout(self.source_timeout, source.attempt(video_id))
            .await
            .map_err(|_| YoutubeError::Timeout(self.source_timeout))??;

        if text.trim().is_empty() {
            return Err(YoutubeError::no_captions("source returned empty text"));
        }
        Ok(text)
    }

    /// Resolve a transcript as plain text for prompt assembly.
    ///
    /// Timestamp markers from timestamped sources are removed.
    pub async fn resolve(&self, video_id: &str) -> Option<String> {
        for source in &self.sources {
            match self.attempt(source.as_ref(), video_id).await {
                Ok(text) => {
                    info!(video_id, source = source.name(), "Transcript resolved");
                    let text = if source.timestamped() {
                        strip_timestamps(&text)
                    } else {
                        text
                    };
                    return Some(text);
                }
                Err(e) => {
                    debug!(
                        video_id,
                        source = source.name(),
                        kind = e.kind(),
                        error = %e,
                        "Transcript source failed, trying next"
                    );
                }
            }
        }

        warn!(video_id, "No transcript source could serve this video");
        None
    }

    /// Resolve a single video's transcript, keeping `[MM:SS]` markers when the
    /// standalone source can serve it. Falls back to [`resolve`](Self::resolve).
    pub async fn resolve_standalone(&self, video_id: &str) -> Option<String> {
        if let Some(source) = &self.standalone {
            match self.attempt(source.as_ref(), video_id).await {
                Ok(text) => {
                    info!(video_id, source = source.name(), "Standalone transcript resolved");
                    return Some(text);
                }
                Err(e) => {
                    debug!(
                        video_id,
                        source = source.name(),
                        error = %e,
                        "Standalone source failed, using fallback chain"
                    );
                }
            }
        }

        self.resolve(video_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        name: &'static str,
        result: Option<&'static str>,
        timestamped: bool,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(name: &'static str, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Some(text),
                timestamped: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: None,
                timestamped: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscriptSource for FixedSource {
        fn name(&self) -> &'static str {
            self.name
        }

        fn timestamped(&self) -> bool {
            self.timestamped
        }

        async fn attempt(&self, _video_id: &str) -> YoutubeResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .ok_or_else(|| YoutubeError::no_captions(self.name))
        }
    }

    struct SlowSource;

    #[async_trait]
    impl TranscriptSource for SlowSource {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn attempt(&self, _video_id: &str) -> YoutubeResult<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = FixedSource::failing("first");
        let second = FixedSource::ok("second", "hello");
        let third = FixedSource::ok("third", "unused");

        let sources: Vec<Arc<dyn TranscriptSource>> =
            vec![first.clone(), second.clone(), third.clone()];
        let resolver = TranscriptResolver::new(sources, Duration::from_secs(5));

        assert_eq!(resolver.resolve("abc").await.as_deref(), Some("hello"));
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_sources_fail_returns_none() {
        let resolver = TranscriptResolver::new(
            vec![FixedSource::failing("a"), FixedSource::failing("b")],
            Duration::from_secs(5),
        );
        assert_eq!(resolver.resolve("abc").await, None);
    }

    #[tokio::test]
    async fn test_empty_text_counts_as_failure() {
        let resolver = TranscriptResolver::new(
            vec![FixedSource::ok("blank", "   "), FixedSource::ok("real", "text")],
            Duration::from_secs(5),
        );
        assert_eq!(resolver.resolve("abc").await.as_deref(), Some("text"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let fallback = FixedSource::ok("fallback", "fallback text");
        let resolver = TranscriptResolver::new(
            vec![Arc::new(SlowSource), fallback.clone()],
            Duration::from_secs(5),
        );

        let started = tokio::time::Instant::now();
        assert_eq!(resolver.resolve("abc").await.as_deref(), Some("fallback text"));
        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_timestamps_stripped_in_chain_kept_standalone() {
        let panel = Arc::new(FixedSource {
            name: "panel",
            result: Some("[00:01] Hello\n[00:05] again"),
            timestamped: true,
            calls: AtomicUsize::new(0),
        });

        let chained = TranscriptResolver::new(vec![panel.clone()], Duration::from_secs(5));
        assert_eq!(chained.resolve("abc").await.as_deref(), Some("Hello\nagain"));

        let standalone = TranscriptResolver::new(
            vec![FixedSource::ok("plain", "plain")],
            Duration::from_secs(5),
        )
        .with_standalone_source(panel);
        assert_eq!(
            standalone.resolve_standalone("abc").await.as_deref(),
            Some("[00:01] Hello\n[00:05] again")
        );
    }

    #[tokio::test]
    async fn test_standalone_falls_back_to_chain() {
        let resolver = TranscriptResolver::new(
            vec![FixedSource::ok("plain", "plain")],
            Duration::from_secs(5),
        )
        .with_standalone_source(FixedSource::failing("panel"));
        assert_eq!(resolver.resolve_standalone("abc").await.as_deref(), Some("plain"));
    }

    #[test]
    fn test_default_chain_order() {
        let client = YoutubeClient::new(Default::default()).unwrap();
        let resolver = TranscriptResolver::from_client(client);
        assert_eq!(resolver.source_names(), vec!["player_api", "page_captions"]);

        let client = YoutubeClient::new(crate::client::YoutubeConfig {
            enable_panel_source: true,
            ..Default::default()
        })
        .unwrap();
        let resolver = TranscriptResolver::from_client(client);
        assert_eq!(
            resolver.source_names(),
            vec!["player_api", "page_captions", "transcript_panel"]
        );
    }
}
