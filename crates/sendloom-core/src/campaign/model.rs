//! Campaign model types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::CampaignStatus;
use crate::template::TemplateId;

/// Unique identifier for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub i64);

impl CampaignId {
    /// Create a new campaign ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted campaign: a template bound to concrete values and a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier.
    pub id: CampaignId,
    /// Template this campaign renders.
    pub template_id: TemplateId,
    /// Operator-chosen campaign name.
    pub name: String,
    /// Subject line, copied from the template at creation time.
    pub subject: String,
    /// Custom-variable bindings. System variables are not stored here; the
    /// dispatch subsystem resolves them per recipient at send time.
    pub constants_values: BTreeMap<String, String>,
    /// When to send, as a UTC instant.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// IANA timezone used to display the schedule to the operator.
    pub send_timezone: Option<String>,
    /// Lifecycle status.
    pub status: CampaignStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// When delivery completed, if it has.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Returns true while the campaign can still be cancelled.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.status.can_transition_to(CampaignStatus::Cancelled)
    }
}

/// The submission packet the wizard hands to the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    /// Operator-chosen campaign name.
    pub name: String,
    /// Template to render.
    pub template_id: TemplateId,
    /// Custom-variable bindings only.
    pub constants_values: BTreeMap<String, String>,
    /// When to send, as a UTC instant.
    pub scheduled_for: DateTime<Utc>,
    /// IANA timezone used for display.
    pub send_timezone: String,
}
