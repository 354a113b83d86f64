//! Ranking of enriched video records.

use std::cmp::Ordering;

use tscript_models::VideoRecord;

fn compare(a: &VideoRecord, b: &VideoRecord) -> Ordering {
    let a_attempted = !a.transcript.is_unavailable();
    let b_attempted = !b.transcript.is_unavailable();

    b_attempted
        .cmp(&a_attempted)
        .then_with(|| b.views_numeric.total_cmp(&a.views_numeric))
}

/// Order records for display and prompt selection.
///
/// Records whose transcript is not the "unavailable" sentinel come first,
/// then higher view counts. The sort is stable, so ties keep extraction
/// order.
pub fn rank_videos(mut records: Vec<VideoRecord>) -> Vec<VideoRecord> {
    records.sort_by(compare);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscript_models::TranscriptState;

    fn record(id: &str, views: f64, transcript: TranscriptState) -> VideoRecord {
        let mut record = VideoRecord::new(id, id, "thumb");
        record.views_numeric = views;
        record.with_transcript(transcript)
    }

    fn ids(records: &[VideoRecord]) -> Vec<&str> {
        records.iter().map(|r| r.video_id.as_str()).collect()
    }

    #[test]
    fn test_transcripts_before_views() {
        let ranked = rank_videos(vec![
            record("popular", 1_000_000.0, TranscriptState::Unavailable),
            record("small", 10.0, TranscriptState::Text("t".into())),
            record("medium", 5_000.0, TranscriptState::Text("t".into())),
        ]);
        assert_eq!(ids(&ranked), vec!["medium", "small", "popular"]);
    }

    #[test]
    fn test_fetch_failed_ranks_with_attempted() {
        let ranked = rank_videos(vec![
            record("none", 900.0, TranscriptState::Unavailable),
            record("failed", 100.0, TranscriptState::FetchFailed),
        ]);
        assert_eq!(ids(&ranked), vec!["failed", "none"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let ranked = rank_videos(vec![
            record("a", 50.0, TranscriptState::Text("t".into())),
            record("b", 50.0, TranscriptState::Text("t".into())),
            record("c", 0.0, TranscriptState::Unavailable),
            record("d", 0.0, TranscriptState::Unavailable),
        ]);
        assert_eq!(ids(&ranked), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_views_non_increasing_within_groups() {
        let ranked = rank_videos(vec![
            record("u1", 3.0, TranscriptState::Unavailable),
            record("t1", 1.0, TranscriptState::Text("t".into())),
            record("u2", 7.0, TranscriptState::Unavailable),
            record("t2", 9.0, TranscriptState::FetchFailed),
            record("t3", 4.0, TranscriptState::Text("t".into())),
        ]);

        let split = ranked
            .iter()
            .position(|r| r.transcript.is_unavailable())
            .unwrap();
        assert!(ranked[split..].iter().all(|r| r.transcript.is_unavailable()));
        for group in [&ranked[..split], &ranked[split..]] {
            assert!(group
                .windows(2)
                .all(|w| w[0].views_numeric >= w[1].views_numeric));
        }
    }
}
