//! The campaign creation wizard state machine.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use sendloom_template::{classify, render};

use super::draft::{CampaignDraft, CampaignMetadata};
use super::step::WizardStep;
use super::validation::ValidationError;
use crate::campaign::{Campaign, CampaignStore, NewCampaign};
use crate::clock::{Clock, SystemClock};
use crate::template::{Template, TemplateId};
use crate::{Error, Result};

/// Demo bindings used for the review preview. Real sends resolve system
/// variables per recipient; the preview only needs legible sample data.
const PREVIEW_SYSTEM_VALUES: [(&str, &str); 3] = [
    ("company_name", "Your Company"),
    ("subscriber_email", "john@example.com"),
    ("subscriber_username", "john_doe"),
];

/// Drives the four-step campaign creation flow.
///
/// The wizard owns the in-progress [`CampaignDraft`], the template list
/// fetched once per mount, and an injected [`Clock`] for the schedule gate.
/// Each operator session owns its own wizard exclusively; nothing here is
/// shared across sessions.
#[derive(Debug)]
pub struct CampaignWizard<C: Clock = SystemClock> {
    templates: Vec<Arc<Template>>,
    draft: CampaignDraft,
    clock: C,
}

impl CampaignWizard<SystemClock> {
    /// Creates a wizard over the given template list, using the system clock.
    #[must_use]
    pub fn new(templates: Vec<Template>) -> Self {
        Self::with_clock(templates, SystemClock)
    }
}

impl<C: Clock> CampaignWizard<C> {
    /// Creates a wizard with an explicit clock.
    #[must_use]
    pub fn with_clock(templates: Vec<Template>, clock: C) -> Self {
        Self {
            templates: templates.into_iter().map(Arc::new).collect(),
            draft: CampaignDraft::new(),
            clock,
        }
    }

    /// The templates available on the selection step.
    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.templates
    }

    /// Snapshot of the in-progress draft.
    #[must_use]
    pub fn draft(&self) -> &CampaignDraft {
        &self.draft
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.draft.step
    }

    /// Errors from the latest validation pass.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.draft.validation_errors
    }

    /// The selected template's custom variables, in declaration order.
    #[must_use]
    pub fn custom_variables(&self) -> Vec<String> {
        self.draft
            .selected_template
            .as_ref()
            .map(|template| classify(&template.variables).custom)
            .unwrap_or_default()
    }

    /// Selects a template by identity.
    ///
    /// Re-initializes the custom-variable bindings to empty strings for
    /// every custom variable the template declares. This happens
    /// unconditionally, even when the same template is selected again:
    /// stale values entered before a detour through other steps must not
    /// silently survive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if `id` is not in the mounted
    /// list.
    pub fn select_template(&mut self, id: TemplateId) -> Result<()> {
        let template = self
            .templates
            .iter()
            .find(|template| template.id == Some(id))
            .cloned()
            .ok_or(Error::TemplateNotFound(id))?;

        self.draft.custom_values = classify(&template.variables)
            .custom
            .into_iter()
            .map(|name| (name, String::new()))
            .collect();
        debug!(
            "selected template {id} with {} custom variables",
            self.draft.custom_values.len()
        );
        self.draft.selected_template = Some(template);
        self.draft.validation_errors.clear();
        Ok(())
    }

    /// Sets the value of one custom variable.
    ///
    /// Names the selected template does not declare as custom are ignored:
    /// system variables are never operator-entered.
    pub fn set_custom_value(&mut self, name: &str, value: impl Into<String>) {
        if let Some(slot) = self.draft.custom_values.get_mut(name) {
            *slot = value.into();
        } else {
            warn!("ignoring value for undeclared custom variable {name}");
        }
    }

    /// Sets the campaign metadata fields.
    pub fn set_metadata(&mut self, metadata: CampaignMetadata) {
        self.draft.name = metadata.name;
        self.draft.scheduled_for = metadata.scheduled_for;
        self.draft.display_timezone = metadata.display_timezone;
    }

    /// Attempts to advance one step.
    ///
    /// Runs the departing step's validation gate. On failure the step does
    /// not change and the draft's error list, replaced wholesale each pass,
    /// describes every problem at once. `Review` never advances; leaving it
    /// goes through [`submit`](Self::submit).
    pub fn advance(&mut self) -> bool {
        self.draft.validation_errors = self.gate_errors();
        if !self.draft.validation_errors.is_empty() {
            return false;
        }

        match self.draft.step.next() {
            Some(next) => {
                debug!("advance: {} -> {next}", self.draft.step);
                self.draft.step = next;
                true
            }
            None => false,
        }
    }

    /// Steps back to the predecessor step.
    ///
    /// Always allowed except on the first step. Entered data is preserved.
    pub fn retreat(&mut self) -> bool {
        match self.draft.step.previous() {
            Some(previous) => {
                debug!("retreat: {} -> {previous}", self.draft.step);
                self.draft.step = previous;
                self.draft.validation_errors.clear();
                true
            }
            None => false,
        }
    }

    /// Discards the draft and returns to a fresh selection step.
    ///
    /// No side effects beyond dropping the entered data.
    pub fn cancel(&mut self) {
        debug!("wizard cancelled at {}", self.draft.step);
        self.draft = CampaignDraft::new();
    }

    /// Renders the selected template's HTML body against sample data.
    ///
    /// Only available on the review step. Display-only; never persisted.
    #[must_use]
    pub fn preview(&self) -> Option<String> {
        if self.draft.step != WizardStep::Review {
            return None;
        }
        let template = self.draft.selected_template.as_ref()?;
        Some(render(&template.html_body, &self.preview_values()))
    }

    fn preview_values(&self) -> BTreeMap<String, String> {
        let mut values: BTreeMap<String, String> = PREVIEW_SYSTEM_VALUES
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        values.extend(self.draft.custom_values.clone());
        values
    }

    /// Submits the reviewed draft to the persistence collaborator.
    ///
    /// At most one submission is in flight per draft; a call while one is
    /// outstanding, or away from the review step, returns `None` without
    /// touching the draft. On success the wizard resets to a fresh selection
    /// step and yields the persisted campaign. On failure the wizard stays
    /// on review with a single `submit`-scoped error and every entered value
    /// intact, so the operator retries without data loss.
    pub async fn submit<S: CampaignStore>(&mut self, store: &S) -> Option<Campaign> {
        if self.draft.step != WizardStep::Review || self.draft.is_submitting {
            return None;
        }
        let Some(template) = self.draft.selected_template.as_ref() else {
            self.draft.validation_errors = vec![ValidationError::NoTemplateSelected];
            return None;
        };
        let Some(template_id) = template.id else {
            self.draft.validation_errors =
                vec![ValidationError::Submit("template has no identity".to_string())];
            return None;
        };
        let Some(scheduled_for) = self.draft.scheduled_for else {
            self.draft.validation_errors = vec![ValidationError::MissingSchedule];
            return None;
        };

        let new = NewCampaign {
            name: self.draft.name.clone(),
            template_id,
            constants_values: self.draft.custom_values.clone(),
            scheduled_for,
            send_timezone: self.draft.display_timezone.clone(),
        };

        self.draft.is_submitting = true;
        let result = store.create_campaign(&new).await;
        self.draft.is_submitting = false;

        match result {
            Ok(campaign) => {
                debug!("campaign {} created; resetting wizard", campaign.id);
                self.draft = CampaignDraft::new();
                Some(campaign)
            }
            Err(error) => {
                warn!("campaign submission failed: {error}");
                self.draft.validation_errors = vec![ValidationError::Submit(error.message)];
                None
            }
        }
    }

    /// The departing step's validation errors; empty when the gate passes.
    fn gate_errors(&self) -> Vec<ValidationError> {
        match self.draft.step {
            WizardStep::TemplateSelect => {
                if self.draft.selected_template.is_none() {
                    vec![ValidationError::NoTemplateSelected]
                } else {
                    Vec::new()
                }
            }
            WizardStep::ConstantsFill => self
                .custom_variables()
                .into_iter()
                .filter(|name| {
                    self.draft
                        .custom_values
                        .get(name)
                        .is_none_or(|value| value.trim().is_empty())
                })
                .map(ValidationError::MissingConstant)
                .collect(),
            WizardStep::Metadata => {
                let mut errors = Vec::new();
                if self.draft.name.trim().is_empty() {
                    errors.push(ValidationError::EmptyName);
                }
                match self.draft.scheduled_for {
                    None => errors.push(ValidationError::MissingSchedule),
                    Some(at) if at <= self.clock.now() => {
                        errors.push(ValidationError::ScheduleInPast);
                    }
                    Some(_) => {}
                }
                errors
            }
            WizardStep::Review => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::campaign::{CampaignId, CampaignStatus, StoreError};
    use crate::clock::FixedClock;

    fn promo_template() -> Template {
        let mut template = Template::new(
            "Weekly promo",
            "{{company_name}} deals",
            "<p>Hi {{subscriber_username}}, use {{offer_code}} before {{deadline}}</p>",
        );
        template.id = Some(TemplateId::new(1));
        template.variables = vec![
            "company_name".to_string(),
            "subscriber_username".to_string(),
            "offer_code".to_string(),
            "deadline".to_string(),
        ];
        template
    }

    fn plain_template() -> Template {
        let mut template = Template::new("Plain", "Hello", "<p>No placeholders</p>");
        template.id = Some(TemplateId::new(2));
        template
    }

    fn wizard() -> CampaignWizard<FixedClock> {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        CampaignWizard::with_clock(vec![promo_template(), plain_template()], FixedClock(now))
    }

    fn fill_to_review(wizard: &mut CampaignWizard<FixedClock>) {
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());
        wizard.set_custom_value("offer_code", "SAVE20");
        wizard.set_custom_value("deadline", "June 30");
        assert!(wizard.advance());
        wizard.set_metadata(CampaignMetadata {
            name: "June promo".to_string(),
            scheduled_for: Some(Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap()),
            display_timezone: "Europe/London".to_string(),
        });
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    /// Store that fails a configured number of times, then succeeds.
    struct FlakyStore {
        failures_left: Cell<u32>,
        created: RefCell<Vec<NewCampaign>>,
    }

    impl FlakyStore {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Cell::new(times),
                created: RefCell::new(Vec::new()),
            }
        }
    }

    impl CampaignStore for FlakyStore {
        async fn create_campaign(
            &self,
            new: &NewCampaign,
        ) -> std::result::Result<Campaign, StoreError> {
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(StoreError::new("backend unavailable"));
            }
            self.created.borrow_mut().push(new.clone());
            let now = Utc::now();
            Ok(Campaign {
                id: CampaignId::new(1),
                template_id: new.template_id,
                name: new.name.clone(),
                subject: "{{company_name}} deals".to_string(),
                constants_values: new.constants_values.clone(),
                scheduled_for: Some(new.scheduled_for),
                send_timezone: Some(new.send_timezone.clone()),
                status: CampaignStatus::Draft,
                created_at: now,
                updated_at: now,
                sent_at: None,
            })
        }
    }

    #[test]
    fn test_cannot_advance_without_a_template() {
        let mut wizard = wizard();
        assert!(!wizard.advance());
        assert_eq!(wizard.errors(), [ValidationError::NoTemplateSelected]);
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
    }

    #[test]
    fn test_selecting_an_unknown_template_fails() {
        let mut wizard = wizard();
        let result = wizard.select_template(TemplateId::new(404));
        assert!(matches!(result, Err(Error::TemplateNotFound(_))));
        assert!(wizard.draft().selected_template.is_none());
    }

    #[test]
    fn test_selection_initializes_custom_values_only() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();

        let draft = wizard.draft();
        assert_eq!(draft.custom_values.len(), 2);
        assert_eq!(draft.custom_values["offer_code"], "");
        assert_eq!(draft.custom_values["deadline"], "");
        // System variables never become operator-entered fields.
        assert!(!draft.custom_values.contains_key("company_name"));
        assert!(!draft.custom_values.contains_key("subscriber_username"));
    }

    #[test]
    fn test_blank_constant_blocks_the_constants_gate() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());
        wizard.set_custom_value("offer_code", "   ");
        wizard.set_custom_value("deadline", "June 30");

        assert!(!wizard.advance());
        assert_eq!(wizard.step(), WizardStep::ConstantsFill);
        assert_eq!(
            wizard.errors(),
            [ValidationError::MissingConstant("offer_code".to_string())]
        );

        wizard.set_custom_value("offer_code", "SAVE20");
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Metadata);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn test_errors_are_replaced_not_merged() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());

        assert!(!wizard.advance());
        assert_eq!(wizard.errors().len(), 2);

        wizard.set_custom_value("offer_code", "SAVE20");
        assert!(!wizard.advance());
        assert_eq!(
            wizard.errors(),
            [ValidationError::MissingConstant("deadline".to_string())]
        );
    }

    #[test]
    fn test_undeclared_custom_values_are_ignored() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        wizard.set_custom_value("company_name", "Spoofed Inc");
        wizard.set_custom_value("unrelated", "x");

        assert!(!wizard.draft().custom_values.contains_key("company_name"));
        assert!(!wizard.draft().custom_values.contains_key("unrelated"));
    }

    #[test]
    fn test_metadata_gate_rejects_past_schedule() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());
        wizard.set_custom_value("offer_code", "SAVE20");
        wizard.set_custom_value("deadline", "June 30");
        assert!(wizard.advance());

        wizard.set_metadata(CampaignMetadata {
            name: "June promo".to_string(),
            scheduled_for: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            display_timezone: "UTC".to_string(),
        });
        assert!(!wizard.advance());
        assert_eq!(wizard.errors(), [ValidationError::ScheduleInPast]);
        assert_eq!(wizard.draft().error_for("scheduled_for").as_deref(),
            Some("Scheduled time must be in the future"));

        wizard.set_metadata(CampaignMetadata {
            name: "June promo".to_string(),
            scheduled_for: Some(Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap()),
            display_timezone: "UTC".to_string(),
        });
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_metadata_gate_requires_name_and_schedule() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(2)).unwrap();
        assert!(wizard.advance());
        // No custom variables on this template; the gate passes untouched.
        assert!(wizard.advance());

        assert!(!wizard.advance());
        assert_eq!(
            wizard.errors(),
            [ValidationError::EmptyName, ValidationError::MissingSchedule]
        );
    }

    #[test]
    fn test_retreat_preserves_entered_data() {
        let mut wizard = wizard();
        fill_to_review(&mut wizard);

        assert!(wizard.retreat());
        assert_eq!(wizard.step(), WizardStep::Metadata);
        assert!(wizard.retreat());
        assert_eq!(wizard.step(), WizardStep::ConstantsFill);
        assert_eq!(wizard.draft().custom_values["offer_code"], "SAVE20");
        assert_eq!(wizard.draft().name, "June promo");

        // Forward again without reselecting; values survive.
        assert!(wizard.advance());
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Review);

        assert!(wizard.retreat());
        assert!(wizard.retreat());
        assert!(wizard.retreat());
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
        assert!(!wizard.retreat());
    }

    #[test]
    fn test_reselecting_the_same_template_resets_values() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());
        wizard.set_custom_value("offer_code", "SAVE20");

        assert!(wizard.retreat());
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert_eq!(wizard.draft().custom_values["offer_code"], "");
    }

    #[test]
    fn test_switching_templates_discards_old_bindings() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.advance());
        wizard.set_custom_value("offer_code", "SAVE20");

        assert!(wizard.retreat());
        wizard.select_template(TemplateId::new(2)).unwrap();
        assert!(wizard.draft().custom_values.is_empty());
    }

    #[test]
    fn test_cancel_discards_the_draft() {
        let mut wizard = wizard();
        fill_to_review(&mut wizard);

        wizard.cancel();
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
        assert!(wizard.draft().selected_template.is_none());
        assert!(wizard.draft().custom_values.is_empty());
        assert!(wizard.draft().name.is_empty());
    }

    #[test]
    fn test_preview_renders_demo_and_custom_values() {
        let mut wizard = wizard();

        // Not on review yet: no preview.
        wizard.select_template(TemplateId::new(1)).unwrap();
        assert!(wizard.preview().is_none());

        fill_to_review(&mut wizard);
        let preview = wizard.preview().unwrap();
        assert_eq!(
            preview,
            "<p>Hi john_doe, use SAVE20 before June 30</p>"
        );
    }

    #[tokio::test]
    async fn test_submit_packages_the_draft() {
        let mut wizard = wizard();
        fill_to_review(&mut wizard);

        let store = FlakyStore::failing(0);
        let campaign = wizard.submit(&store).await.unwrap();
        assert_eq!(campaign.name, "June promo");

        let created = store.created.borrow();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].template_id, TemplateId::new(1));
        assert_eq!(created[0].constants_values["offer_code"], "SAVE20");
        assert_eq!(created[0].send_timezone, "Europe/London");

        // Success resets the wizard for the next campaign.
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
        assert!(wizard.draft().selected_template.is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_the_draft_for_retry() {
        let mut wizard = wizard();
        fill_to_review(&mut wizard);

        let store = FlakyStore::failing(1);
        assert!(wizard.submit(&store).await.is_none());

        // Still on review, with a submit-scoped error and the data intact.
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(!wizard.draft().is_submitting);
        assert_eq!(
            wizard.errors(),
            [ValidationError::Submit("backend unavailable".to_string())]
        );
        assert_eq!(wizard.draft().name, "June promo");
        assert_eq!(wizard.draft().custom_values["offer_code"], "SAVE20");

        // Retry succeeds without re-entering anything.
        let campaign = wizard.submit(&store).await.unwrap();
        assert_eq!(campaign.name, "June promo");
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
    }

    #[tokio::test]
    async fn test_submit_is_review_only() {
        let mut wizard = wizard();
        wizard.select_template(TemplateId::new(1)).unwrap();

        let store = FlakyStore::failing(0);
        assert!(wizard.submit(&store).await.is_none());
        assert!(store.created.borrow().is_empty());
    }
}
