//! View-count parsing and magnitude formatting.
//!
//! Listings display counts with East Asian magnitude units ("1.2万回視聴",
//! "3億回視聴") or plain digits with separators ("1,234 views").

use std::sync::OnceLock;

use regex::Regex;

/// Ratio of views used to estimate likes.
///
/// This is a fixed heuristic with no source validation: the listing does not
/// expose like counts, so the estimate is labelled as such wherever shown.
pub const LIKES_ESTIMATE_RATIO: f64 = 0.045;

const MAN: f64 = 10_000.0;
const OKU: f64 = 100_000_000.0;

fn views_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9][0-9,]*(?:\.[0-9]+)?)(万|億|[KkMB])?(?:回視聴|回|views?)?$")
            .expect("valid views regex")
    })
}

/// Parse a displayed view count into a number.
///
/// Returns 0 for absent, "N/A" or otherwise unparseable input.
pub fn parse_views(raw: &str) -> f64 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(caps) = views_pattern().captures(&compact) else {
        return 0.0;
    };

    let number: f64 = match caps[1].replace(',', "").parse() {
        Ok(n) => n,
        Err(_) => return 0.0,
    };

    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("万") => MAN,
        Some("億") => OKU,
        Some("K") | Some("k") => 1_000.0,
        Some("M") => 1_000_000.0,
        Some("B") => 1_000_000_000.0,
        _ => 1.0,
    };

    number * multiplier
}

/// Format a count back into human-readable magnitude units.
///
/// Units are chosen after rounding, so 99,999,999 renders as "1億".
pub fn format_magnitude(value: f64) -> String {
    if round_tenth(value / MAN) >= MAN {
        format!("{}億", trim_decimal(value / OKU))
    } else if value.round() >= MAN {
        format!("{}万", trim_decimal(value / MAN))
    } else {
        format!("{}", value.round() as u64)
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Estimate likes from a parsed view count.
///
/// `None` when there are no views to estimate from.
pub fn estimate_likes(views_numeric: f64) -> Option<String> {
    if views_numeric <= 0.0 {
        return None;
    }
    Some(format_magnitude(views_numeric * LIKES_ESTIMATE_RATIO))
}

fn trim_decimal(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    formatted
        .strip_suffix(".0")
        .map(str::to_string)
        .unwrap_or(formatted)
}
