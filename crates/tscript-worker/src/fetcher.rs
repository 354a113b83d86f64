//! Parallel transcript fetching.
//!
//! Each record gets its own task, bounded by a semaphore and a per-task
//! timeout. A failed or timed-out task only affects its own record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};
use tscript_models::{TranscriptState, VideoRecord};
use tscript_youtube::TranscriptResolver;

use crate::metrics;

/// Resolves transcripts for a batch of records concurrently.
#[derive(Clone)]
pub struct TranscriptFetcher {
    resolver: Arc<TranscriptResolver>,
    max_concurrent: usize,
    task_timeout: Duration,
}

impl TranscriptFetcher {
    pub fn new(
        resolver: Arc<TranscriptResolver>,
        max_concurrent: usize,
        task_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            max_concurrent: max_concurrent.max(1),
            task_timeout,
        }
    }

    /// Attach a transcript state to every record.
    ///
    /// The output has the same length and order as the input.
    pub async fn fetch_all(&self, records: Vec<VideoRecord>) -> Vec<VideoRecord> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total = records.len();

        let tasks: Vec<_> = records
            .into_iter()
            .map(|record| {
                let resolver = Arc::clone(&self.resolver);
                let semaphore = Arc::clone(&semaphore);
                let task_timeout = self.task_timeout;
                let video_id = record.video_id.clone();

                let handle = tokio::spawn(async move {
                    // The semaphore is never closed, so acquire only fails on shutdown
                    let _permit = semaphore.acquire_owned().await.ok();
                    tokio::time::timeout(task_timeout, resolver.resolve(&video_id)).await
                });

                async move {
                    let started = Instant::now();
                    let state = match handle.await {
                        Ok(Ok(Some(text))) => TranscriptState::Text(text),
                        Ok(Ok(None)) => TranscriptState::Unavailable,
                        Ok(Err(_)) => {
                            warn!(
                                video_id = %record.video_id,
                                timeout_secs = task_timeout.as_secs(),
                                "Transcript task timed out"
                            );
                            TranscriptState::FetchFailed
                        }
                        Err(e) => {
                            warn!(
                                video_id = %record.video_id,
                                error = %e,
                                "Transcript task failed"
                            );
                            TranscriptState::FetchFailed
                        }
                    };
                    metrics::record_transcript(state.as_str(), started.elapsed().as_secs_f64());
                    record.with_transcript(state)
                }
            })
            .collect();

        let results = join_all(tasks).await;

        let resolved = results
            .iter()
            .filter(|r| r.transcript.text().is_some())
            .count();
        info!(total, resolved, "Transcript fetching complete");

        results
    }
}
