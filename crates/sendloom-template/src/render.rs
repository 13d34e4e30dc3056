//! Single-pass placeholder substitution.

use std::collections::BTreeMap;

use crate::extract::PLACEHOLDER;

/// Replaces every `{{identifier}}` occurrence in `text` with its bound value.
///
/// Unresolved placeholders are preserved verbatim (no error, no blank
/// substitution), so partial-data previews stay legible and missing bindings
/// remain visible to the operator.
///
/// Exactly one substitution pass is performed: a value that itself contains
/// `{{…}}` syntax is emitted as-is, never re-expanded. This bounds expansion
/// against placeholder syntax smuggled in through operator-supplied values.
///
/// ```
/// use std::collections::BTreeMap;
/// use sendloom_template::render;
///
/// let mut values = BTreeMap::new();
/// values.insert("name".to_string(), "Ada".to_string());
/// assert_eq!(render("Hi {{name}} ({{email}})", &values), "Hi Ada ({{email}})");
/// ```
#[must_use]
pub fn render(text: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
