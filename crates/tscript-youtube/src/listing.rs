//! Search listing retrieval.
//!
//! The results page carries its data as `var ytInitialData = {...};`. Every
//! `videoRenderer` object in that tree is one listed video.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use tscript_models::SearchRequest;

use crate::client::YoutubeClient;
use crate::error::YoutubeResult;
use crate::json::{collect_key, extract_embedded_json, text_of};
use crate::search::build_search_url;

/// One listing entry as found on the page. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawVideoEntry {
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub channel: Option<String>,
    pub views_text: Option<String>,
    pub published_text: Option<String>,
}

impl RawVideoEntry {
    fn from_renderer(renderer: &Value) -> Self {
        let non_empty = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let thumbnail_url = renderer
            .pointer("/thumbnail/thumbnails")
            .and_then(Value::as_array)
            .and_then(|thumbs| thumbs.last())
            .and_then(|thumb| thumb.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let channel = renderer
            .get("ownerText")
            .or_else(|| renderer.get("longBylineText"))
            .and_then(text_of);

        Self {
            video_id: renderer
                .get("videoId")
                .and_then(Value::as_str)
                .map(str::to_string),
            title: renderer.get("title").and_then(text_of).and_then(non_empty),
            thumbnail_url,
            channel: channel.and_then(non_empty),
            views_text: renderer
                .get("viewCountText")
                .and_then(text_of)
                .and_then(non_empty),
            published_text: renderer
                .get("publishedTimeText")
                .and_then(text_of)
                .and_then(non_empty),
        }
    }
}

/// Parse a results page into raw entries, in page order.
pub fn parse_listing(html: &str) -> YoutubeResult<Vec<RawVideoEntry>> {
    let data = extract_embedded_json(html, "ytInitialData")?;

    let mut renderers = Vec::new();
    collect_key(&data, "videoRenderer", &mut renderers);

    Ok(renderers
        .into_iter()
        .map(RawVideoEntry::from_renderer)
        .collect())
}

/// Supplies raw listing entries for a search request.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listing(&self, request: &SearchRequest) -> YoutubeResult<Vec<RawVideoEntry>>;
}

/// Listing source backed by the public search results page.
#[derive(Debug, Clone)]
pub struct SearchPageListing {
    client: YoutubeClient,
}

impl SearchPageListing {
    pub fn new(client: YoutubeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListingSource for SearchPageListing {
    async fn fetch_listing(&self, request: &SearchRequest) -> YoutubeResult<Vec<RawVideoEntry>> {
        let path = build_search_url(request);
        info!(keyword = %request.keyword, "Fetching search listing");

        let html = self.client.get_text(&path).await?;
        let entries = parse_listing(&html)?;

        debug!(count = entries.len(), "Parsed listing entries");
        Ok(entries)
    }
}
