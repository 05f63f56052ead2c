use chrono::{DateTime, FixedOffset};
use lazy_regex::regex;
use serde_json::Value;

/// Trims the text, turns line breaks into spaces and collapses repeated spaces.
pub fn normalize_text(text: &str) -> String {
    let text = text.trim().replace(['\n', '\r'], " ");
    regex!(r" {2,}").replace_all(&text, " ").into_owned()
}

/// Same as [`normalize_text`], an absent text becomes an empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

/// Normalizes JSON strings, `null` becomes `""` and any other value is left untouched.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(s) => Value::String(normalize_text(&s)),
        other => other,
    }
}

pub(crate) fn get_now() -> DateTime<FixedOffset> {
    let now = chrono::offset::Local::now();
    now.with_timezone(now.offset())
}
