//! Prompt builders for the three analysis stages.
//!
//! Templates are plain strings with `{name}` placeholders filled by [`fill`];
//! JSON braces in the templates are literal.

pub mod additional;
pub mod critical;
pub mod video;

use serde::Serialize;
use serde_json::Value;

/// Rendered in place of empty prompt inputs.
pub const NONE_TEXT: &str = "없음";

/// Replace every `{name}` placeholder with its value in a single pass, so
/// substituted text is never scanned again. Unknown placeholders are kept.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `value`, or [`NONE_TEXT`] when blank.
pub fn or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        NONE_TEXT
    } else {
        value
    }
}

/// Render items as `- item` lines. Strings are used as-is, anything else as
/// compact JSON; an empty list renders as [`NONE_TEXT`].
pub fn format_list<T: Serialize>(items: &[T]) -> String {
    if items.is_empty() {
        return NONE_TEXT.to_string();
    }
    items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(Value::String(s)) => format!("- {}", s),
            Ok(other) => format!("- {}", other),
            Err(_) => "- ".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact JSON, or [`NONE_TEXT`] for absent values.
pub fn json_or_none<T: Serialize>(value: Option<&T>) -> String {
    value
        .and_then(|v| serde_json::to_string(v).ok())
        .unwrap_or_else(|| NONE_TEXT.to_string())
}

/// Keep at most `max` characters. Returns whether anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}
