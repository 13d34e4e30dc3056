//! # sendloom-core
//!
//! Campaign composition core for Sendloom.
//!
//! This crate provides:
//! - Template and campaign domain models
//! - Local storage (`SQLite`) repositories
//! - **Campaign Wizard** - the four-step campaign creation flow
//! - Campaign status lifecycle
//! - An injected clock for deterministic schedule validation
//!
//! The placeholder engine itself (extraction, classification, rendering)
//! lives in the `sendloom-template` crate; this crate wires it into the
//! template repository boundary and the wizard.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod campaign;
pub mod clock;
mod error;
pub mod template;
pub mod wizard;

pub use campaign::{
    Campaign, CampaignId, CampaignRepository, CampaignStatus, CampaignStore, NewCampaign,
    StoreError,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use template::{Template, TemplateId, TemplateRepository};
pub use wizard::{CampaignDraft, CampaignMetadata, CampaignWizard, ValidationError, WizardStep};
