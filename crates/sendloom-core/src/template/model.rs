//! Template model types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sendloom_template::{classify, extract_variables};

/// Unique identifier for a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub i64);

impl TemplateId {
    /// Create a new template ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reusable email skeleton with named placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (None for unsaved templates).
    pub id: Option<TemplateId>,
    /// Display name.
    pub name: String,
    /// Subject line; may itself contain placeholders.
    pub subject: String,
    /// HTML body; may itself contain placeholders.
    pub html_body: String,
    /// Optional plain-text body.
    pub text_body: Option<String>,
    /// Canonical ordered list of unique placeholder identifiers declared for
    /// this template. Declarations are not reconciled against the body: a
    /// declared-but-unused or used-but-undeclared name is a user-visible
    /// concern, not an engine error.
    pub variables: Vec<String>,
    /// Whether the template can be used for new campaigns.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Creates a new active template with the given content and no declared
    /// variables.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: None,
            variables: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The placeholders actually present in the subject and HTML body,
    /// deduplicated and sorted.
    #[must_use]
    pub fn scanned_variables(&self) -> Vec<String> {
        let names: BTreeSet<String> = extract_variables(&self.subject)
            .into_iter()
            .chain(extract_variables(&self.html_body))
            .collect();
        names.into_iter().collect()
    }

    /// The declared variables requiring operator-entered values, in
    /// declaration order.
    #[must_use]
    pub fn custom_variables(&self) -> Vec<String> {
        classify(&self.variables).custom
    }

    /// The declared variables resolved automatically at send time, in
    /// declaration order.
    #[must_use]
    pub fn system_variables(&self) -> Vec<String> {
        classify(&self.variables).system
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod template_id_tests {
        use super::*;

        #[test]
        fn new() {
            let id = TemplateId::new(42);
            assert_eq!(id.0, 42);
        }

        #[test]
        fn display() {
            let id = TemplateId::new(7);
            assert_eq!(format!("{id}"), "7");
        }
    }

    mod template_tests {
        use super::*;

        #[test]
        fn new_is_active_and_undeclared() {
            let template = Template::new("Promo", "Big news", "<p>Hello</p>");
            assert!(template.id.is_none());
            assert!(template.is_active);
            assert!(template.variables.is_empty());
            assert!(template.text_body.is_none());
        }

        #[test]
        fn scanned_variables_cover_subject_and_body() {
            let template = Template::new(
                "Promo",
                "{{company_name}} weekly",
                "<p>Hi {{subscriber_username}}, use {{offer_code}}</p>",
            );
            assert_eq!(
                template.scanned_variables(),
                ["company_name", "offer_code", "subscriber_username"]
            );
        }

        #[test]
        fn declared_variables_partition() {
            let mut template = Template::new("Promo", "Offer inside", "<p>{{offer_code}}</p>");
            template.variables = vec![
                "offer_code".to_string(),
                "company_name".to_string(),
                "price".to_string(),
            ];
            assert_eq!(template.custom_variables(), ["offer_code", "price"]);
            assert_eq!(template.system_variables(), ["company_name"]);
        }

        #[test]
        fn declarations_are_not_reconciled_with_the_body() {
            // A declared-but-unused variable stays declared; an undeclared
            // placeholder in the body stays out of the declaration.
            let mut template = Template::new("Promo", "Hello", "<p>{{undeclared}}</p>");
            template.variables = vec!["unused".to_string()];
            assert_eq!(template.custom_variables(), ["unused"]);
            assert_eq!(template.scanned_variables(), ["undeclared"]);
        }
    }
}
