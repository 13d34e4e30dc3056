//! The persistence seam the wizard submits through.

use super::model::{Campaign, NewCampaign};

/// Error returned by a campaign store.
///
/// `field` scopes the failure to one payload field when the store can tell;
/// transport-level failures leave it unset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// Payload field the failure is scoped to, if any.
    pub field: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl StoreError {
    /// A failure with no field scope.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// A failure scoped to one payload field.
    #[must_use]
    pub fn scoped(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// A collaborator that persists submitted campaigns.
///
/// The wizard keeps at most one submission in flight per draft and treats
/// every error as recoverable: the draft survives and the operator retries.
#[allow(async_fn_in_trait)] // consumed through generics, never as a trait object
pub trait CampaignStore {
    /// Persists a new campaign in `Draft` status.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the payload was rejected or
    /// why persistence failed.
    async fn create_campaign(&self, new: &NewCampaign) -> Result<Campaign, StoreError>;
}
