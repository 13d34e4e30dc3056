//! Campaign creation wizard.
//!
//! A four-step finite-state flow: select a template, bind its custom
//! variables, enter scheduling metadata, review and submit. Each step gate
//! validates before allowing progression, going back one step is always
//! allowed, and the draft survives failed submissions so the operator never
//! re-enters data.
//!
//! # Example
//!
//! ```ignore
//! use sendloom_core::{CampaignMetadata, CampaignWizard};
//!
//! let mut wizard = CampaignWizard::new(templates);
//! wizard.select_template(template_id)?;
//! wizard.advance();
//! wizard.set_custom_value("offer_code", "SAVE20");
//! wizard.advance();
//! wizard.set_metadata(CampaignMetadata {
//!     name: "January promo".into(),
//!     scheduled_for: Some(send_time),
//!     display_timezone: "UTC".into(),
//! });
//! wizard.advance();
//! let campaign = wizard.submit(&repository).await;
//! ```

mod draft;
mod machine;
mod step;
mod validation;

pub use draft::{CampaignDraft, CampaignMetadata};
pub use machine::CampaignWizard;
pub use step::WizardStep;
pub use validation::ValidationError;
