//! YouTube data access for TrendScript.
//!
//! This crate provides:
//! - Search listing retrieval and `ytInitialData` parsing
//! - Caption track selection and timedtext parsing
//! - Pluggable transcript sources and the fallback resolver

pub mod captions;
pub mod client;
pub mod error;
pub mod json;
pub mod listing;
pub mod resolver;
pub mod search;
pub mod sources;

pub use captions::{format_timestamp, strip_timestamps, CaptionSegment, CaptionTrack};
pub use client::{YoutubeClient, YoutubeConfig};
pub use error::{YoutubeError, YoutubeResult};
pub use listing::{parse_listing, ListingSource, RawVideoEntry, SearchPageListing};
pub use resolver::TranscriptResolver;
pub use search::build_search_url;
pub use sources::{PageCaptionSource, PlayerApiSource, TranscriptPanelSource, TranscriptSource};
