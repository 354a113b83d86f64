//! Caption tracks and timedtext parsing.

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{YoutubeError, YoutubeResult};

/// A caption track advertised by a player response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "languageCode")]
    pub language_code: String,
    /// "asr" for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

/// One timed caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    /// Start offset in seconds
    pub start: f64,
    pub text: String,
}

/// Read the caption track list from a player response.
pub fn caption_tracks(player_response: &Value) -> Vec<CaptionTrack> {
    player_response
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .and_then(|tracks| serde_json::from_value::<Vec<CaptionTrack>>(tracks.clone()).ok())
        .unwrap_or_default()
}

/// Pick a track by language preference.
///
/// Manual tracks win over auto-generated ones for the same language. With
/// `allow_any`, the first listed track is used when no preferred language
/// exists.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred: &[String],
    allow_any: bool,
) -> Option<&'a CaptionTrack> {
    fn matches_lang(track: &CaptionTrack, lang: &str) -> bool {
        track.language_code == lang || track.language_code.starts_with(&format!("{lang}-"))
    }

    for lang in preferred {
        let manual = tracks
            .iter()
            .find(|t| matches_lang(t, lang) && t.kind.as_deref() != Some("asr"));
        if let Some(track) = manual.or_else(|| tracks.iter().find(|t| matches_lang(t, lang))) {
            return Some(track);
        }
    }

    if allow_any {
        tracks.first()
    } else {
        None
    }
}

/// Parse timedtext XML into segments.
///
/// Handles both the classic `<text start="1.2" dur="3.4">` form and the
/// format-3 `<p t="1200" d="3400">` form with millisecond offsets.
pub fn parse_timedtext(xml: &str) -> YoutubeResult<Vec<CaptionSegment>> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut buffer = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"text" | b"p" => {
                    let millis = e.name().as_ref() == b"p";
                    let key: &[u8] = if millis { b"t" } else { b"start" };
                    let start = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == key)
                        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse::<f64>().ok())
                        .unwrap_or(0.0);
                    current_start = Some(if millis { start / 1000.0 } else { start });
                    buffer.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if current_start.is_some() {
                    let raw = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(e).into_owned(),
                    };
                    buffer.push_str(&raw);
                }
            }
            Ok(Event::End(ref e)) => {
                if matches!(e.name().as_ref(), b"text" | b"p") {
                    if let Some(start) = current_start.take() {
                        // Captions are often double-escaped (&amp;#39;)
                        let text = html_escape::decode_html_entities(&buffer)
                            .replace('\n', " ")
                            .trim()
                            .to_string();
                        if !text.is_empty() {
                            segments.push(CaptionSegment { start, text });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(YoutubeError::parse(format!("timedtext XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}

/// Join segments into plain text, one line per segment.
pub fn segments_to_text(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format seconds as `MM:SS`. Minutes are not wrapped at the hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d{2}:\d{2}\]\s").expect("valid timestamp regex"))
}

/// Remove `[MM:SS] ` markers from timestamped transcript text.
pub fn strip_timestamps(text: &str) -> String {
    timestamp_regex().replace_all(text, "").into_owned()
}
