//! Placeholder extraction from template text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// The placeholder grammar: `{{` + identifier + `}}`, where the identifier
/// matches `[A-Za-z_][A-Za-z0-9_]*`. No whitespace is tolerated inside the
/// braces; any other `{{…}}` content is not a placeholder and is left
/// untouched by both extraction and rendering.
#[allow(clippy::expect_used)] // the pattern is a compile-time constant
pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("placeholder pattern compiles")
});

/// Extracts the placeholder identifiers declared in template text.
///
/// The result is deduplicated and lexicographically sorted, so repeated calls
/// and callers comparing variable sets see a stable order. Extraction is
/// total over all strings; empty input yields an empty list.
///
/// ```
/// use sendloom_template::extract_variables;
///
/// let vars = extract_variables("Hi {{name}}, from {{name}} and {{company}}");
/// assert_eq!(vars, ["company", "name"]);
/// ```
#[must_use]
pub fn extract_variables(text: &str) -> Vec<String> {
    let names: BTreeSet<&str> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    names.into_iter().map(ToString::to_string).collect()
}
