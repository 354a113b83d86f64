//! Pipeline orchestration: search, transcripts, ranking, script.

use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use tscript_models::{SearchRequest, VideoRecord};
use tscript_youtube::{ListingSource, SearchPageListing, TranscriptResolver, YoutubeClient};

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::extractor::extract_records;
use crate::fetcher::TranscriptFetcher;
use crate::gemini::GeminiBackend;
use crate::generation::{fallback_script, GeneratedScript, GenerationClient, ScriptKind};
use crate::metrics;
use crate::prompt::SourceTranscript;
use crate::ranking::rank_videos;
use crate::synthesizer::ScriptSynthesizer;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Ranked records, at most `max_videos`
    pub videos: Vec<VideoRecord>,
    pub script: GeneratedScript,
}

impl PipelineOutput {
    pub fn script_text(&self) -> &str {
        &self.script.text
    }
}

/// Runs the whole flow for one search request.
pub struct Pipeline {
    config: PipelineConfig,
    listing: Arc<dyn ListingSource>,
    resolver: Arc<TranscriptResolver>,
    fetcher: TranscriptFetcher,
    synthesizer: ScriptSynthesizer,
}

impl Pipeline {
    /// Assemble the production pipeline.
    ///
    /// Fails without touching the network when the API key is missing.
    pub fn from_config(config: PipelineConfig) -> WorkerResult<Self> {
        config.validate()?;
        let api_key = config.require_api_key()?;

        let youtube = YoutubeClient::new(config.youtube_config()).map_err(|e| {
            WorkerError::config_error(format!("Failed to build HTTP client: {}", e))
        })?;
        let listing: Arc<dyn ListingSource> = Arc::new(SearchPageListing::new(youtube.clone()));
        let resolver = Arc::new(TranscriptResolver::from_client(youtube));

        let backend = Arc::new(GeminiBackend::new(
            api_key,
            &config.gemini_model,
            &config.gemini_base_url,
        )?);
        let client = GenerationClient::new(backend, config.retry_policy());
        let synthesizer = ScriptSynthesizer::new(client, config.output_language.clone());

        Ok(Self::new(config, listing, resolver, synthesizer))
    }

    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        config: PipelineConfig,
        listing: Arc<dyn ListingSource>,
        resolver: Arc<TranscriptResolver>,
        synthesizer: ScriptSynthesizer,
    ) -> Self {
        let fetcher = TranscriptFetcher::new(
            Arc::clone(&resolver),
            config.max_concurrent_transcripts,
            config.transcript_task_timeout,
        );
        Self {
            config,
            listing,
            resolver,
            fetcher,
            synthesizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &TranscriptResolver {
        &self.resolver
    }

    /// Run search, transcript fetching, ranking and generation.
    ///
    /// Only a missing key, an invalid request, a failed or empty listing, and
    /// the overall deadline end a run with an error. Generation problems
    /// degrade to an error message or the static template.
    pub async fn run(&self, request: &SearchRequest) -> WorkerResult<PipelineOutput> {
        self.config.require_api_key()?;
        request.validate()?;

        let limit = self.config.pipeline_deadline;
        let deadline = Instant::now() + limit;
        info!(
            keyword = %request.keyword,
            duration_minutes = request.duration_minutes,
            upload_date = %request.upload_date,
            length = %request.length,
            sort_by = %request.sort_by,
            "Starting pipeline run"
        );

        let entries = timeout_at(deadline, self.listing.fetch_listing(request))
            .await
            .map_err(|_| WorkerError::deadline(limit, "video search"))??;

        let records = extract_records(&entries, self.config.max_videos);
        if records.is_empty() {
            warn!(entries = entries.len(), "No usable videos in listing");
            return Err(WorkerError::NoVideos);
        }
        info!(videos = records.len(), "Fetching transcripts");

        let records = timeout_at(deadline, self.fetcher.fetch_all(records))
            .await
            .map_err(|_| WorkerError::deadline(limit, "transcript fetching"))?;
        let videos = rank_videos(records);

        let sources = select_sources(&videos, self.config.prompt_videos);
        let script = match timeout_at(
            deadline,
            self.synthesizer.synthesize(&sources, request.duration_minutes),
        )
        .await
        {
            Ok(script) => script,
            Err(_) => {
                warn!(
                    deadline_secs = limit.as_secs(),
                    "Deadline reached during generation, using template"
                );
                metrics::record_fallback("template");
                GeneratedScript {
                    text: fallback_script(request.duration_minutes),
                    kind: ScriptKind::Template,
                    attempts: Vec::new(),
                }
            }
        };

        info!(
            videos = videos.len(),
            script_kind = ?script.kind,
            generation_attempts = script.attempts.len(),
            "Pipeline run complete"
        );
        Ok(PipelineOutput { videos, script })
    }
}

/// Prompt inputs: the top `count` records with resolved transcripts.
///
/// When none resolved, the top records are used with their sentinel labels so
/// the prompt still carries the titles.
pub fn select_sources(videos: &[VideoRecord], count: usize) -> Vec<SourceTranscript> {
    let resolved: Vec<_> = videos
        .iter()
        .filter_map(SourceTranscript::from_record)
        .take(count)
        .collect();
    if !resolved.is_empty() {
        return resolved;
    }

    videos
        .iter()
        .take(count)
        .map(|v| SourceTranscript::new(v.title.clone(), v.transcript.display_text()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscript_models::{TranscriptState, UNAVAILABLE_LABEL};

    fn record(id: &str, transcript: TranscriptState) -> VideoRecord {
        VideoRecord::new(id, format!("title {id}"), "thumb").with_transcript(transcript)
    }

    #[test]
    fn test_select_sources_prefers_resolved() {
        let videos = vec![
            record("a", TranscriptState::Text("one".into())),
            record("b", TranscriptState::FetchFailed),
            record("c", TranscriptState::Text("two".into())),
            record("d", TranscriptState::Text("three".into())),
            record("e", TranscriptState::Text("four".into())),
        ];
        let sources = select_sources(&videos, 3);
        let texts: Vec<_> = sources.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_select_sources_without_transcripts() {
        let videos = vec![
            record("a", TranscriptState::Unavailable),
            record("b", TranscriptState::Unavailable),
        ];
        let sources = select_sources(&videos, 3);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "title a");
        assert_eq!(sources[0].text, UNAVAILABLE_LABEL);
    }

    #[test]
    fn test_from_config_requires_key() {
        let result = Pipeline::from_config(PipelineConfig::default());
        assert!(matches!(result, Err(WorkerError::MissingApiKey)));
    }

    #[test]
    fn test_from_config_builds_default_chain() {
        let config = PipelineConfig {
            gemini_api_key: Some("key".to_string()),
            ..Default::default()
        };
        let pipeline = Pipeline::from_config(config).unwrap();
        assert_eq!(
            pipeline.resolver().source_names(),
            vec!["player_api", "page_captions"]
        );
    }
}
