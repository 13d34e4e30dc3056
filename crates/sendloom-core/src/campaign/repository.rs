//! Campaign storage repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use sendloom_template::{RawConstants, classify};

use super::model::{Campaign, CampaignId, NewCampaign};
use super::status::CampaignStatus;
use super::store::{CampaignStore, StoreError};
use crate::template::TemplateId;
use crate::{Error, Result};

/// Repository for campaign storage and lifecycle updates.
///
/// The wizard only ever calls [`create`](Self::create) (through the
/// [`CampaignStore`] seam). The remaining operations are the
/// persistence-side transitions the dispatch subsystem performs.
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Self::with_pool(pool).await
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    /// Create a repository over an existing connection pool.
    ///
    /// Lets the template and campaign repositories share one database.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    ///
    /// The templates table is ensured too: the create path resolves the
    /// referenced template from the same database.
    async fn initialize(&self) -> Result<()> {
        crate::template::ensure_schema(&self.pool).await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS campaigns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                template_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                subject TEXT NOT NULL,
                constants_values TEXT NOT NULL DEFAULT '{}',
                scheduled_for TEXT,
                send_timezone TEXT,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                sent_at TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a campaign from a wizard submission.
    ///
    /// Validates the packet against the referenced template, copies the
    /// template's subject, and persists the row in `Draft` status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if the template does not exist,
    /// or [`Error::Validation`] when the bindings do not cover the
    /// template's custom variables exactly, a value is blank, or the
    /// schedule is not in the future.
    pub async fn create(&self, new: &NewCampaign) -> Result<Campaign> {
        let row = sqlx::query("SELECT subject, variables FROM templates WHERE id = ?")
            .bind(new.template_id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(Error::TemplateNotFound(new.template_id));
        };
        let subject: String = row.get("subject");
        let raw_variables: String = row.get("variables");
        let custom = classify(&RawConstants::Text(raw_variables).into_canonical()).custom;

        // Bindings must cover the custom variables exactly. System variables
        // are never part of the payload; they are resolved per recipient at
        // send time.
        for name in &custom {
            if !new.constants_values.contains_key(name) {
                return Err(Error::Validation {
                    field: name.clone(),
                    message: format!("missing value for {name}"),
                });
            }
        }
        for (name, value) in &new.constants_values {
            if !custom.contains(name) {
                return Err(Error::Validation {
                    field: name.clone(),
                    message: format!("{name} is not a custom variable of this template"),
                });
            }
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    field: name.clone(),
                    message: format!("empty value for {name}"),
                });
            }
        }

        let now = Utc::now();
        if new.scheduled_for <= now {
            return Err(Error::Validation {
                field: "scheduled_for".to_string(),
                message: "scheduled_for must be in the future (UTC)".to_string(),
            });
        }

        let constants_json = serde_json::to_string(&new.constants_values)?;
        let result = sqlx::query(
            r"
            INSERT INTO campaigns
                (template_id, name, subject, constants_values, scheduled_for,
                 send_timezone, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 'draft', ?, ?)
            ",
        )
        .bind(new.template_id.0)
        .bind(&new.name)
        .bind(&subject)
        .bind(&constants_json)
        .bind(new.scheduled_for.to_rfc3339())
        .bind(&new.send_timezone)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = CampaignId::new(result.last_insert_rowid());
        info!("created campaign {id} from template {}", new.template_id);

        Ok(Campaign {
            id,
            template_id: new.template_id,
            name: new.name.clone(),
            subject,
            constants_values: new.constants_values.clone(),
            scheduled_for: Some(new.scheduled_for),
            send_timezone: Some(new.send_timezone.clone()),
            status: CampaignStatus::Draft,
            created_at: now,
            updated_at: now,
            sent_at: None,
        })
    }

    /// Get campaign by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: CampaignId) -> Result<Option<Campaign>> {
        let row = sqlx::query(
            r"
            SELECT id, template_id, name, subject, constants_values,
                   scheduled_for, send_timezone, status, created_at,
                   updated_at, sent_at
            FROM campaigns
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_campaign))
    }

    /// Get all campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Campaign>> {
        let rows = sqlx::query(
            r"
            SELECT id, template_id, name, subject, constants_values,
                   scheduled_for, send_timezone, status, created_at,
                   updated_at, sent_at
            FROM campaigns
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_campaign).collect())
    }

    /// Get all campaigns in the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_status(&self, status: CampaignStatus) -> Result<Vec<Campaign>> {
        let rows = sqlx::query(
            r"
            SELECT id, template_id, name, subject, constants_values,
                   scheduled_for, send_timezone, status, created_at,
                   updated_at, sent_at
            FROM campaigns
            WHERE status = ?
            ORDER BY created_at DESC
            ",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_campaign).collect())
    }

    /// Enqueue a draft campaign for delivery (`Draft` to `Scheduled`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the campaign is a draft,
    /// or [`Error::Validation`] when the schedule is not in the future.
    pub async fn schedule(
        &self,
        id: CampaignId,
        scheduled_for: DateTime<Utc>,
        send_timezone: &str,
    ) -> Result<Campaign> {
        let campaign = self.require(id).await?;
        if !campaign.status.can_transition_to(CampaignStatus::Scheduled) {
            return Err(Error::InvalidTransition {
                from: campaign.status,
                to: CampaignStatus::Scheduled,
            });
        }
        Self::require_future(scheduled_for)?;

        self.update_schedule(id, scheduled_for, send_timezone).await?;
        info!("scheduled campaign {id} for {scheduled_for}");
        self.require(id).await
    }

    /// Move the send time of a not-yet-sent campaign.
    ///
    /// Allowed for `Draft` and `Scheduled` campaigns; either way the
    /// campaign ends up `Scheduled` for the new time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] once delivery has started, or
    /// [`Error::Validation`] when the schedule is not in the future.
    pub async fn reschedule(
        &self,
        id: CampaignId,
        scheduled_for: DateTime<Utc>,
        send_timezone: &str,
    ) -> Result<Campaign> {
        let campaign = self.require(id).await?;
        if !matches!(
            campaign.status,
            CampaignStatus::Draft | CampaignStatus::Scheduled
        ) {
            return Err(Error::InvalidTransition {
                from: campaign.status,
                to: CampaignStatus::Scheduled,
            });
        }
        Self::require_future(scheduled_for)?;

        self.update_schedule(id, scheduled_for, send_timezone).await?;
        info!("rescheduled campaign {id} to {scheduled_for}");
        self.require(id).await
    }

    /// Abandon a campaign before delivery starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the campaign is `Draft`
    /// or `Scheduled`.
    pub async fn cancel(&self, id: CampaignId) -> Result<Campaign> {
        let campaign = self.require(id).await?;
        if !campaign.status.can_transition_to(CampaignStatus::Cancelled) {
            return Err(Error::InvalidTransition {
                from: campaign.status,
                to: CampaignStatus::Cancelled,
            });
        }

        sqlx::query("UPDATE campaigns SET status = 'cancelled', updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        info!("cancelled campaign {id}");
        self.require(id).await
    }

    /// Try to lock a scheduled campaign for delivery (`Scheduled` to
    /// `Sending`).
    ///
    /// Compare-and-set: returns false when the campaign is not currently
    /// `Scheduled`, which is how a second dispatch worker loses the race
    /// instead of double-sending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn acquire_send_lock(&self, id: CampaignId) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE campaigns SET status = 'sending', updated_at = ?
            WHERE id = ? AND status = 'scheduled'
            ",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        let acquired = result.rows_affected() > 0;
        if acquired {
            info!("acquired send lock for campaign {id}");
        } else {
            warn!("send lock for campaign {id} not acquired; not in scheduled status");
        }
        Ok(acquired)
    }

    /// Record completed delivery (`Sending` to `Sent`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the campaign is `Sending`.
    pub async fn mark_sent(&self, id: CampaignId) -> Result<Campaign> {
        let campaign = self.require(id).await?;
        if !campaign.status.can_transition_to(CampaignStatus::Sent) {
            return Err(Error::InvalidTransition {
                from: campaign.status,
                to: CampaignStatus::Sent,
            });
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE campaigns SET status = 'sent', sent_at = ?, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&now)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        info!("campaign {id} sent");
        self.require(id).await
    }

    async fn require(&self, id: CampaignId) -> Result<Campaign> {
        self.get(id).await?.ok_or(Error::CampaignNotFound(id))
    }

    async fn update_schedule(
        &self,
        id: CampaignId,
        scheduled_for: DateTime<Utc>,
        send_timezone: &str,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE campaigns SET status = 'scheduled', scheduled_for = ?,
                                 send_timezone = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(scheduled_for.to_rfc3339())
        .bind(send_timezone)
        .bind(Utc::now().to_rfc3339())
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn require_future(scheduled_for: DateTime<Utc>) -> Result<()> {
        if scheduled_for <= Utc::now() {
            return Err(Error::Validation {
                field: "scheduled_for".to_string(),
                message: "scheduled_for must be in the future (UTC)".to_string(),
            });
        }
        Ok(())
    }
}

impl CampaignStore for CampaignRepository {
    async fn create_campaign(&self, new: &NewCampaign) -> std::result::Result<Campaign, StoreError> {
        self.create(new).await.map_err(|error| match error {
            Error::Validation { field, message } => StoreError::scoped(field, message),
            Error::TemplateNotFound(id) => {
                StoreError::scoped("template_id", format!("Template {id} not found"))
            }
            other => StoreError::new(other.to_string()),
        })
    }
}

/// Convert a database row to a Campaign.
///
/// Rows with unparseable timestamps are dropped; corrupt bindings degrade to
/// an empty map.
fn row_to_campaign(row: &sqlx::sqlite::SqliteRow) -> Option<Campaign> {
    let created_at = parse_timestamp(&row.get::<String, _>("created_at"))?;
    let updated_at = parse_timestamp(&row.get::<String, _>("updated_at"))?;
    let scheduled_for = row
        .get::<Option<String>, _>("scheduled_for")
        .as_deref()
        .and_then(parse_timestamp);
    let sent_at = row
        .get::<Option<String>, _>("sent_at")
        .as_deref()
        .and_then(parse_timestamp);

    let constants_json: String = row.get("constants_values");
    let constants_values: BTreeMap<String, String> =
        serde_json::from_str(&constants_json).unwrap_or_default();

    let status_str: String = row.get("status");

    Some(Campaign {
        id: CampaignId::new(row.get("id")),
        template_id: TemplateId::new(row.get("template_id")),
        name: row.get("name"),
        subject: row.get("subject"),
        constants_values,
        scheduled_for,
        send_timezone: row.get("send_timezone"),
        status: CampaignStatus::parse(&status_str),
        created_at,
        updated_at,
        sent_at,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
