//! Helpers for the JSON blobs YouTube embeds in its pages.

use serde_json::{Deserializer, Value};

use crate::error::{YoutubeError, YoutubeResult};

/// Extract a JSON object assigned to `name` inside a page's inline scripts,
/// e.g. `var ytInitialData = {...};`.
///
/// Only the first complete JSON value after the assignment is decoded, so
/// trailing script text is ignored.
pub fn extract_embedded_json(html: &str, name: &str) -> YoutubeResult<Value> {
    let mut search_from = 0;
    while let Some(pos) = html[search_from..].find(name) {
        let after_name = search_from + pos + name.len();
        let rest = html[after_name..].trim_start();
        if let Some(rest) = rest.strip_prefix('=') {
            let rest = rest.trim_start();
            if rest.starts_with('{') {
                let mut stream = Deserializer::from_str(rest).into_iter::<Value>();
                return match stream.next() {
                    Some(Ok(value)) => Ok(value),
                    Some(Err(e)) => Err(YoutubeError::Json(e)),
                    None => Err(YoutubeError::missing_data(name)),
                };
            }
        }
        search_from = after_name;
    }
    Err(YoutubeError::missing_data(name))
}

/// Depth-first search for the first value stored under `key`.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// Collect every value stored under `key`, in document order.
pub fn collect_key<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                } else {
                    collect_key(v, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_key(item, key, out);
            }
        }
        _ => {}
    }
}

/// Read a YouTube text object: either `{"simpleText": ..}` or `{"runs": [{"text": ..}]}`.
pub fn text_of(value: &Value) -> Option<String> {
    if let Some(simple) = value.get("simpleText").and_then(Value::as_str) {
        return Some(simple.to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_embedded_json() {
        let html = r#"<script>var ytInitialData = {"a": {"b": "}"}};var other = 1;</script>"#;
        let value = extract_embedded_json(html, "ytInitialData").unwrap();
        assert_eq!(value["a"]["b"], "}");
    }

    #[test]
    fn test_extract_skips_non_assignment_mentions() {
        let html = r#"if (window.ytInitialPlayerResponse) {} var ytInitialPlayerResponse = {"ok": true};"#;
        let value = extract_embedded_json(html, "ytInitialPlayerResponse").unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_extract_missing() {
        let err = extract_embedded_json("<html></html>", "ytInitialData").unwrap_err();
        assert!(matches!(err, YoutubeError::MissingData(_)));
    }

    #[test]
    fn test_find_and_collect() {
        let value = json!({"x": [{"target": 1}, {"nested": {"target": 2}}]});
        assert_eq!(find_key(&value, "target"), Some(&json!(1)));

        let mut out = Vec::new();
        collect_key(&value, "target", &mut out);
        assert_eq!(out, vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_text_of() {
        assert_eq!(text_of(&json!({"simpleText": "12万回視聴"})).as_deref(), Some("12万回視聴"));
        assert_eq!(
            text_of(&json!({"runs": [{"text": "Hello "}, {"text": "world"}]})).as_deref(),
            Some("Hello world")
        );
        assert_eq!(text_of(&json!({"runs": []})), None);
    }
}
