//! JSON extraction from model text.

use serde_json::Value;

use crate::error::{LlmError, LlmResult};

/// Extract the JSON object from a model reply.
///
/// Prefers the content of a ```` ```json ```` (or bare ```` ``` ````) fence,
/// falling back to the outermost `{...}` span.
pub fn extract_json(text: &str) -> LlmResult<Value> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    let mut last_error = None;
    for candidate in [fenced_block(text), brace_span(text), Some(text)]
        .into_iter()
        .flatten()
    {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    Err(LlmError::parse(
        last_error.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = match text.find("```json") {
        Some(pos) => pos + "```json".len(),
        None => text.find("```")? + "```".len(),
    };
    let rest = &text[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    let block = rest[..end].trim();
    (!block.is_empty()).then_some(block)
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
