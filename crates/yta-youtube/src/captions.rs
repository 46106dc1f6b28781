//! Caption file parsing into plain transcript text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{YouTubeError, YouTubeResult};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Parse WebVTT into space-joined caption text.
///
/// Auto-generated tracks repeat each line as it rolls up, so consecutive
/// duplicates are dropped.
pub fn parse_vtt(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_block = false;
    let mut raw_lines = content.lines().map(str::trim).peekable();

    while let Some(line) = raw_lines.next() {
        if line.is_empty() {
            in_block = false;
            continue;
        }
        if in_block {
            continue;
        }
        // NOTE, STYLE and REGION blocks run until the next blank line
        if line.starts_with("NOTE") || line == "STYLE" || line == "REGION" {
            in_block = true;
            continue;
        }
        if line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.contains("-->")
        {
            continue;
        }
        let is_cue_number = line.chars().all(|c| c.is_ascii_digit())
            && raw_lines.peek().is_some_and(|next| next.contains("-->"));
        if is_cue_number {
            continue;
        }

        let text = TAG_PATTERN.replace_all(line, "");
        let text = decode_entities(&text);
        let text = WHITESPACE.replace_all(text.trim(), " ").into_owned();
        if text.is_empty() {
            continue;
        }

        if lines.last() != Some(&text) {
            lines.push(text);
        }
    }

    lines.join(" ")
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse YouTube's `json3` caption format.
pub fn parse_json3(content: &str) -> YouTubeResult<String> {
    let doc: Json3 = serde_json::from_str(content)
        .map_err(|e| YouTubeError::invalid_response(format!("json3 captions: {}", e)))?;

    let mut lines: Vec<String> = Vec::new();
    for event in doc.events {
        let Some(segs) = event.segs else { continue };
        let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
        let text = WHITESPACE.replace_all(text.trim(), " ").into_owned();
        if text.is_empty() {
            continue;
        }
        if lines.last() != Some(&text) {
            lines.push(text);
        }
    }

    Ok(lines.join(" "))
}

/// Decode the HTML entities that show up in caption text.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
