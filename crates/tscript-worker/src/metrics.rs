//! Pipeline metrics.
//!
//! Counters are no-ops until a recorder is installed by the host process.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Transcript outcomes by state (text, unavailable, fetch_failed).
    pub const TRANSCRIPTS_TOTAL: &str = "tscript_transcripts_total";

    /// Transcript task duration in seconds.
    pub const TRANSCRIPT_SECONDS: &str = "tscript_transcript_seconds";

    /// Listing entries skipped for missing required fields.
    pub const LISTING_SKIPPED_TOTAL: &str = "tscript_listing_skipped_total";

    /// Retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "tscript_retries_total";

    /// Generation calls by tier and result.
    pub const GENERATIONS_TOTAL: &str = "tscript_generations_total";

    /// Degradations to a shorter prompt or the static template.
    pub const FALLBACKS_TOTAL: &str = "tscript_fallbacks_total";
}

pub fn record_transcript(outcome: &str, elapsed_secs: f64) {
    counter!(names::TRANSCRIPTS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::TRANSCRIPT_SECONDS).record(elapsed_secs);
}

pub fn record_listing_skipped(reason: &'static str) {
    counter!(names::LISTING_SKIPPED_TOTAL, "reason" => reason).increment(1);
}

pub fn record_retry(operation: &str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}

pub fn record_generation(tier: &'static str, result: &'static str) {
    counter!(
        names::GENERATIONS_TOTAL,
        "tier" => tier,
        "result" => result
    )
    .increment(1);
}

pub fn record_fallback(kind: &'static str) {
    counter!(names::FALLBACKS_TOTAL, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::TRANSCRIPTS_TOTAL.starts_with("tscript_"));
        assert!(names::RETRIES_TOTAL.contains("retries"));
        assert!(names::FALLBACKS_TOTAL.contains("fallbacks"));
    }

    #[test]
    fn test_recording_without_recorder() {
        record_transcript("text", 0.5);
        record_retry("gemini_generate");
        record_fallback("template");
    }
}
