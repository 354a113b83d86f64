//! Metadata extraction: raw listing entries into video records.

use std::collections::HashSet;

use tracing::{debug, warn};
use tscript_models::{estimate_likes, is_valid_youtube_id, parse_views, VideoRecord};
use tscript_youtube::RawVideoEntry;

use crate::metrics;

/// Upper bound on records taken from one listing.
pub const MAX_VIDEOS: usize = 10;

/// Build up to `limit` records from a listing, in page order.
///
/// Entries missing a title, a valid video id or a thumbnail are skipped.
/// Duplicate ids keep their first occurrence. Optional fields never cause a
/// skip; unparseable view counts become 0.
pub fn extract_records(entries: &[RawVideoEntry], limit: usize) -> Vec<VideoRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        if records.len() >= limit {
            break;
        }

        let Some(video_id) = entry.video_id.as_deref().filter(|id| is_valid_youtube_id(id)) else {
            warn!(index, "Skipping listing entry without a valid video id");
            metrics::record_listing_skipped("video_id");
            continue;
        };
        let Some(title) = entry.title.as_deref() else {
            warn!(index, video_id, "Skipping listing entry without a title");
            metrics::record_listing_skipped("title");
            continue;
        };
        let Some(thumbnail_url) = entry.thumbnail_url.as_deref() else {
            warn!(index, video_id, "Skipping listing entry without a thumbnail");
            metrics::record_listing_skipped("thumbnail");
            continue;
        };

        if !seen.insert(video_id.to_string()) {
            debug!(video_id, "Skipping duplicate listing entry");
            continue;
        }

        let mut record = VideoRecord::new(video_id, title, thumbnail_url);
        record.channel = entry.channel.clone().unwrap_or_default();
        record.publish_date_raw = entry.published_text.clone();
        if let Some(views) = &entry.views_text {
            record.views_numeric = parse_views(views);
            record.estimated_likes = estimate_likes(record.views_numeric);
            record.views_raw = Some(views.clone());
        }

        records.push(record);
    }

    debug!(
        entries = entries.len(),
        records = records.len(),
        "Extracted video records"
    );
    records
}
