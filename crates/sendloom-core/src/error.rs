//! Error types for the core library.

use thiserror::Error;

use crate::campaign::{CampaignId, CampaignStatus};
use crate::template::TemplateId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Template not found.
    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// Campaign not found.
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// A field failed validation.
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// Field the failure is scoped to.
        field: String,
        /// Human-readable description.
        message: String,
    },

    /// A campaign status change the lifecycle does not allow.
    #[error("Invalid status transition: {from} to {to}")]
    InvalidTransition {
        /// Status the campaign is currently in.
        from: CampaignStatus,
        /// Status that was requested.
        to: CampaignStatus,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
