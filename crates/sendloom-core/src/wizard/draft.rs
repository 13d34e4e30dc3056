//! In-progress campaign draft state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::step::WizardStep;
use super::validation::ValidationError;
use crate::template::Template;

/// Campaign metadata entered on the [`WizardStep::Metadata`] step.
#[derive(Debug, Clone)]
pub struct CampaignMetadata {
    /// Operator-chosen campaign name.
    pub name: String,
    /// When to send, as a UTC instant.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// IANA timezone used to display the schedule.
    pub display_timezone: String,
}

impl Default for CampaignMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            scheduled_for: None,
            display_timezone: "UTC".to_string(),
        }
    }
}

/// The wizard-owned, not-yet-persisted campaign in progress.
///
/// Mutated only through the wizard's step transitions and field-edit
/// operations; discarded on cancel or superseded by the persisted
/// [`Campaign`](crate::campaign::Campaign) on successful submission.
#[derive(Debug, Clone)]
pub struct CampaignDraft {
    /// Current wizard step.
    pub step: WizardStep,
    /// Selected template, shared with the wizard's mounted list.
    pub selected_template: Option<Arc<Template>>,
    /// Custom-variable bindings; one entry per declared custom variable of
    /// the selected template.
    pub custom_values: BTreeMap<String, String>,
    /// Campaign name (Metadata step).
    pub name: String,
    /// Scheduled send time (Metadata step).
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Timezone for displaying the schedule; defaults to UTC.
    pub display_timezone: String,
    /// Errors from the latest validation pass; replaced, never merged.
    pub validation_errors: Vec<ValidationError>,
    /// True while a submission is in flight.
    pub is_submitting: bool,
}

impl Default for CampaignDraft {
    fn default() -> Self {
        Self {
            step: WizardStep::TemplateSelect,
            selected_template: None,
            custom_values: BTreeMap::new(),
            name: String::new(),
            scheduled_for: None,
            display_timezone: "UTC".to_string(),
            validation_errors: Vec::new(),
            is_submitting: false,
        }
    }
}

impl CampaignDraft {
    /// Creates a fresh draft at the first step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest validation message for a field, if any.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<String> {
        self.validation_errors
            .iter()
            .find(|error| error.field() == field)
            .map(ValidationError::message)
    }
}
