//! Normalization of the template `variables` declaration.
//!
//! The boundary format changed over the system's history: current rows carry
//! a native JSON array, older rows a JSON-encoded array inside a string, and
//! the oldest a comma-separated string. The normalizer folds all of them into
//! one canonical ordered list at the repository boundary so nothing
//! downstream ever re-parses.

use serde::Deserialize;
use serde_json::Value;

/// A template variable declaration as it arrives from storage or an API
/// payload, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawConstants {
    /// Native ordered list (current encoding).
    List(Vec<Value>),
    /// JSON-encoded array text or comma-separated text (legacy encodings).
    Text(String),
    /// Anything else; normalizes to an empty list.
    Other(Value),
}

impl RawConstants {
    /// Resolves this declaration into the canonical ordered list of unique
    /// names.
    ///
    /// Tolerant of malformed input: a corrupt or unexpected encoding degrades
    /// to best-effort comma splitting or an empty list, never to an error.
    #[must_use]
    pub fn into_canonical(self) -> Vec<String> {
        match self {
            Self::List(items) => {
                dedup(items.iter().filter_map(Value::as_str).map(str::to_owned))
            }
            Self::Text(text) => normalize_text(&text),
            Self::Other(_) => Vec::new(),
        }
    }
}

impl From<Value> for RawConstants {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items),
            Value::String(text) => Self::Text(text),
            other => Self::Other(other),
        }
    }
}

/// Normalizes any historical `variables` encoding into the canonical ordered
/// list of unique names. Never fails.
///
/// ```
/// use serde_json::json;
/// use sendloom_template::normalize_constants;
///
/// assert_eq!(normalize_constants(&json!(["a", "b", "a"])), ["a", "b"]);
/// assert_eq!(normalize_constants(&json!(r#"["x","y"]"#)), ["x", "y"]);
/// assert_eq!(normalize_constants(&json!("x, y ,")), ["x", "y"]);
/// assert!(normalize_constants(&json!(null)).is_empty());
/// ```
#[must_use]
pub fn normalize_constants(raw: &Value) -> Vec<String> {
    RawConstants::from(raw.clone()).into_canonical()
}

fn normalize_text(text: &str) -> Vec<String> {
    // Newer rows store a JSON array inside the text column; anything that
    // does not decode that way falls back to comma splitting.
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        return dedup(items.iter().filter_map(Value::as_str).map(str::to_owned));
    }

    dedup(
        text.split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_owned),
    )
}

fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
