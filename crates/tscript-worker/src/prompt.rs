//! Prompt building under a word budget.
//!
//! Words are whitespace-delimited tokens, used as an approximation of model
//! tokens. Two tiers exist: the primary prompt with per-video excerpts, and a
//! much shorter fallback used after quota exhaustion.

use tscript_models::VideoRecord;
use tscript_youtube::format_timestamp;

/// Word ceiling for the combined source text.
pub const MAX_PROMPT_WORDS: usize = 2000;

/// Words taken from each transcript when several are combined.
pub const PER_VIDEO_WORDS: usize = 500;

/// Character ceiling for the source text of the fallback prompt.
pub const FALLBACK_SOURCE_CHARS: usize = 1000;

const HOOK_SECS: u32 = 10;
const INTRO_SECS: u32 = 30;
const CLOSING_SECS: u32 = 30;
const MIN_MAIN_SECS: u32 = 30;

/// Limits governing truncation and the output-token ceiling of each tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBudget {
    pub max_words: usize,
    pub per_video_words: usize,
    pub fallback_chars: usize,
    pub max_output_tokens: u32,
    pub fallback_max_output_tokens: u32,
    pub duration_minutes: u32,
}

impl PromptBudget {
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            max_words: MAX_PROMPT_WORDS,
            per_video_words: PER_VIDEO_WORDS,
            fallback_chars: FALLBACK_SOURCE_CHARS,
            max_output_tokens: 8192,
            fallback_max_output_tokens: 2000,
            duration_minutes,
        }
    }

    /// Seconds left for the main section once hook, intro and closing are reserved.
    pub fn main_section_secs(&self) -> u32 {
        (self.duration_minutes.saturating_mul(60))
            .saturating_sub(HOOK_SECS + INTRO_SECS + CLOSING_SECS)
            .max(MIN_MAIN_SECS)
    }
}

/// A transcript selected for the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTranscript {
    pub title: String,
    pub text: String,
}

impl SourceTranscript {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Only records with resolved transcript text qualify.
    pub fn from_record(record: &VideoRecord) -> Option<Self> {
        record
            .transcript
            .text()
            .map(|text| Self::new(record.title.clone(), text))
    }
}

/// Keep the first `max_words` whitespace tokens.
///
/// Text within the limit is returned unchanged; longer text is rejoined with
/// single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    words[..max_words].join(" ")
}

/// Keep the first `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Concatenate transcripts into one labelled source block.
///
/// Transcript words across all blocks stay within `max_words`; labels are not
/// counted. With several transcripts each contributes at most
/// `per_video_words`, while a single transcript may use the whole budget.
pub fn combine_sources(sources: &[SourceTranscript], budget: &PromptBudget) -> String {
    let per_video = if sources.len() > 1 {
        budget.per_video_words
    } else {
        budget.max_words
    };

    let mut remaining = budget.max_words;
    let mut blocks = Vec::with_capacity(sources.len());
    for (i, source) in sources.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let excerpt = truncate_words(&source.text, per_video.min(remaining));
        remaining -= excerpt.split_whitespace().count();
        blocks.push(format!("Video {}: {}\n{}", i + 1, source.title, excerpt));
    }

    blocks.join("\n\n")
}

/// Primary prompt: pattern analysis plus a timed, sectioned script.
pub fn build_prompt(sources: &[SourceTranscript], budget: &PromptBudget, language: &str) -> String {
    let duration = budget.duration_minutes;
    let main_secs = budget.main_section_secs();
    let intro_at = format_timestamp(f64::from(HOOK_SECS));
    let main_at = format_timestamp(f64::from(HOOK_SECS + INTRO_SECS));
    let closing_at = format_timestamp(f64::from(HOOK_SECS + INTRO_SECS + main_secs));
    let source_text = combine_sources(sources, budget);
    let count = sources.len();

    format!(
        r#"You are an experienced YouTube scriptwriter. Below are transcripts of {count} trending videos on the same topic.

{source_text}

First, analyze what these videos have in common that made them successful:
- how they grab attention in the opening seconds
- how the main points are structured and paced
- the examples, metaphors and tone they use
- how they ask viewers to act

Then write an original script for a new {duration}-minute video that applies those patterns from a fresh angle.

Divide the script into these sections, starting each one with its [MM:SS] timestamp:
[00:00] Hook ({HOOK_SECS} seconds)
[{intro_at}] Introduction ({INTRO_SECS} seconds)
[{main_at}] Main content ({main_secs} seconds)
[{closing_at}] Closing and call to action ({CLOSING_SECS} seconds)

The script must fit in {duration} minutes. Write the entire script in {language}.
"#
    )
}

/// Fallback prompt: a hard character cut of the source and minimal instructions.
pub fn build_fallback_prompt(
    sources: &[SourceTranscript],
    budget: &PromptBudget,
    language: &str,
) -> String {
    let duration = budget.duration_minutes;
    let source_text = truncate_chars(&combine_sources(sources, budget), budget.fallback_chars);

    format!(
        r#"Write a {duration}-minute YouTube script in {language} based on this material. Use sections for hook, introduction, main content and closing, each starting with a [MM:SS] timestamp.

{source_text}
"#
    )
}
