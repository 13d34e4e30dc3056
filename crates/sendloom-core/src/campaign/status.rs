//! Campaign status lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted campaign.
///
/// Campaigns are created in `Draft`, move to `Scheduled` when enqueued, are
/// locked into `Sending` by the dispatch worker, and finish in `Sent`.
/// `Cancelled` is reachable from `Draft` or `Scheduled` only. `Sent` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Created but not yet enqueued for delivery.
    #[default]
    Draft,
    /// Enqueued; picked up by the dispatch worker at the scheduled time.
    Scheduled,
    /// Locked by the dispatch worker; delivery in progress.
    Sending,
    /// Delivery finished.
    Sent,
    /// Abandoned before delivery started.
    Cancelled,
}

impl CampaignStatus {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "cancelled" => Self::Cancelled,
            _ => Self::Draft,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Scheduled => "Scheduled",
            Self::Sending => "Sending",
            Self::Sent => "Sent",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Returns true once no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Cancelled)
    }

    /// Returns true if the lifecycle permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Scheduled | Self::Cancelled)
                | (Self::Scheduled, Self::Sending | Self::Cancelled)
                | (Self::Sending, Self::Sent)
        )
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
