//! Generator response parsing
//!
//! Isolates a JSON array from whatever the generator wrapped around it:
//! markdown fences, leading prose, trailing commentary.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::PlanningError;

/// Fenced code block (optionally tagged `json`) wrapping an array
static FENCED_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").expect("valid regex"));

/// Slice `text` from its first `[` to the matching `]`
///
/// Brackets inside string literals are counted too. Returns `None` when there is no
/// `[` or the brackets never balance.
pub fn balanced_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the JSON array embedded in a generator response
///
/// A fenced block wins when present; the bracket walk then trims anything
/// after the array. Unbalanced text is parsed as-is and will usually fail.
pub fn extract_json_array(text: &str) -> Result<Vec<Value>, PlanningError> {
    let mut content = text.trim();
    debug!(chars = content.len(), "extract_json_array: called");

    if let Some(inner) = FENCED_ARRAY_RE.captures(content).and_then(|c| c.get(1)) {
        debug!("extract_json_array: using fenced block");
        content = inner.as_str();
    }

    if let Some(span) = balanced_array_span(content) {
        content = span;
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => {
            debug!(count = items.len(), "extract_json_array: parsed");
            Ok(items)
        }
        Ok(other) => Err(PlanningError::MalformedGeneration(format!(
            "expected an array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(PlanningError::MalformedGeneration(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
