//! Utilities for extracting structured data from LLM responses.
//!
//! Responses often wrap JSON in markdown fences or surrounding prose. The
//! scanners here are string-aware, so braces inside string literals do not
//! unbalance a span, and they never fail hard: callers get `None` or a
//! zero value and carry on.

use quill_core::{Issue, SceneSpec};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// How a scene design was recovered from Director output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecSource {
    /// The whole response parsed as JSON
    Strict,
    /// A JSON object was found inside surrounding text
    Extracted,
    /// Nothing parsed; the zero-value design is used
    Fallback,
}

impl SpecSource {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecSource::Strict => "strict",
            SpecSource::Extracted => "extracted",
            SpecSource::Fallback => "fallback",
        }
    }
}

/// Recover a scene design from Director output.
///
/// Strict parse first, then every fenced block and balanced `{...}` span in
/// order until one parses. Falls back to `SceneSpec::default()`.
pub fn parse_scene_spec(text: &str) -> (SceneSpec, SpecSource) {
    if let Ok(spec) = serde_json::from_str::<SceneSpec>(text.trim()) {
        return (spec, SpecSource::Strict);
    }

    if let Some(spec) = extract_from_code_block(text)
        .and_then(|block| serde_json::from_str::<SceneSpec>(block).ok())
    {
        debug!("Recovered scene design from code block");
        return (spec, SpecSource::Extracted);
    }

    if let Some(spec) = first_parsing::<SceneSpec>(text, '{', '}') {
        debug!("Recovered scene design from embedded object");
        return (spec, SpecSource::Extracted);
    }

    warn!(
        response_length = text.len(),
        preview = %preview(text),
        "Director output held no parseable scene design, using empty design"
    );
    (SceneSpec::default(), SpecSource::Fallback)
}

/// Parse Checker output into issues.
///
/// Accepts a bare array or an object with an `issues` array. Elements that
/// are not valid issues are skipped. Returns `None` when no array is found.
pub fn parse_issues(text: &str) -> Option<Vec<Issue>> {
    let values = json_array(text, "issues")?;
    let total = values.len();
    let issues: Vec<Issue> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Issue>(value) {
            Ok(issue) => Some(issue),
            Err(e) => {
                warn!(error = %e, "Skipping malformed issue");
                None
            }
        })
        .collect();
    debug!(total, kept = issues.len(), "Parsed checker issues");
    Some(issues)
}

/// Parse a JSON array of strings, skipping non-string elements.
pub fn parse_string_list(text: &str) -> Option<Vec<String>> {
    let values = json_array(text, "facts")?;
    Some(
        values
            .into_iter()
            .filter_map(|value| match value {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
    )
}

/// Find an array either at the top level or under `key` of an object.
fn json_array(text: &str, key: &str) -> Option<Vec<serde_json::Value>> {
    let value = serde_json::from_str::<serde_json::Value>(text.trim())
        .ok()
        .or_else(|| {
            extract_from_code_block(text).and_then(|block| serde_json::from_str(block).ok())
        })
        .or_else(|| first_parsing::<serde_json::Value>(text, '[', ']'))
        .or_else(|| first_parsing::<serde_json::Value>(text, '{', '}'))?;

    match value {
        serde_json::Value::Array(values) => Some(values),
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(serde_json::Value::Array(values)) => Some(values),
            _ => None,
        },
        _ => None,
    }
}

/// First balanced span that deserializes into `T`.
fn first_parsing<T: DeserializeOwned>(text: &str, open: char, close: char) -> Option<T> {
    balanced_spans(text, open, close).find_map(|span| serde_json::from_str(span).ok())
}

/// Content of the first fenced code block, if any.
fn extract_from_code_block(response: &str) -> Option<&str> {
    let start = response.find("```")?;
    let after_fence = &response[start + 3..];
    // Skip the language tag line.
    let body_start = after_fence.find('\n').map(|n| n + 1)?;
    let body = &after_fence[body_start..];
    let content = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };
    let content = content.trim();
    (!content.is_empty()).then_some(content)
}

/// Every balanced `open..close` span, scanning left to right.
fn balanced_spans(text: &str, open: char, close: char) -> impl Iterator<Item = &str> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = text[cursor..].find(open) {
            let start = cursor + offset;
            cursor = start + open.len_utf8();
            if let Some(len) = balanced_len(&text[start..], open, close) {
                cursor = start + len;
                return Some(&text[start..start + len]);
            }
        }
        None
    })
}

/// Byte length of the balanced span starting at `text[0]`.
fn balanced_len(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i + ch.len_utf8());
            }
        }
    }

    None
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}
