//! Prompt-body helpers: `{placeholder}` extraction and local validation of
//! the inputs an editor composes before any request is sent.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum entry title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum score a record can carry.
pub const MAX_SCORE: i64 = 5;

/// Regex pattern matching `{placeholder}` tokens in prompt bodies.
pub const PLACEHOLDER_PATTERN: &str = r"\{[a-zA-Z_][a-zA-Z0-9_.]*\}";

/// Compiled regex for `{placeholder}` extraction. Compiled once, reused forever.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Placeholder extraction
// ---------------------------------------------------------------------------

/// Extract all `{placeholder}` tokens from a prompt body.
///
/// Returns a de-duplicated, sorted list of placeholder names (without
/// braces). Substitution itself is the store's job; this exists so the
/// detail view can show which variables a body consumes.
pub fn extract_placeholders(body: &str) -> Vec<String> {
    let mut placeholders: Vec<String> = PLACEHOLDER_RE
        .find_iter(body)
        .map(|m| {
            let s = m.as_str();
            s[1..s.len() - 1].to_string()
        })
        .collect();
    placeholders.sort();
    placeholders.dedup();
    placeholders
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an entry title: must be non-empty and within the length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a score: integer between 0 and [`MAX_SCORE`] inclusive.
pub fn validate_score(score: i64) -> Result<(), CoreError> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(CoreError::Validation(format!(
            "Score must be between 0 and {MAX_SCORE} (got {score})"
        )));
    }
    Ok(())
}

/// Parse a variable-override widget value into a substitution map.
///
/// The widget carries JSON text. It must be an object whose values are
/// scalars; numbers and booleans are coerced to their display form, null
/// becomes the empty string. Anything else is a `Validation` error raised
/// before a request is issued. An empty or whitespace-only widget is an
/// empty map.
pub fn parse_variable_overrides(raw: &str) -> Result<BTreeMap<String, String>, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CoreError::Validation(format!("Variable overrides are not valid JSON: {e}")))?;
    let serde_json::Value::Object(map) = value else {
        return Err(CoreError::Validation(
            "Variable overrides must be a JSON object".to_string(),
        ));
    };

    let mut overrides = BTreeMap::new();
    for (key, value) in map {
        let rendered = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            other => {
                return Err(CoreError::Validation(format!(
                    "Variable '{key}' must be a scalar, got {other}"
                )))
            }
        };
        overrides.insert(key, rendered);
    }
    Ok(overrides)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
