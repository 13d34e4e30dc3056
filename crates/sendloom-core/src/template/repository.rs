//! Template storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use sendloom_template::RawConstants;

use super::model::{Template, TemplateId};
use crate::{Error, Result};

/// Repository for template storage and retrieval.
///
/// Templates are read-only from the wizard's perspective; writes come from
/// the template management surface.
pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
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
    async fn initialize(&self) -> Result<()> {
        ensure_schema(&self.pool).await
    }

    /// Get all templates, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Template>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, subject, html_body, text_body, variables,
                   is_active, created_at, updated_at
            FROM templates
            ORDER BY updated_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let templates = rows.iter().filter_map(row_to_template).collect();
        Ok(templates)
    }

    /// Get template by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: TemplateId) -> Result<Option<Template>> {
        let row = sqlx::query(
            r"
            SELECT id, name, subject, html_body, text_body, variables,
                   is_active, created_at, updated_at
            FROM templates
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_template))
    }

    /// Save a template (insert or update).
    ///
    /// The `variables` declaration is stored as JSON array text, the current
    /// canonical encoding. `updated_at` is bumped on every save.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails.
    pub async fn save(&self, template: &mut Template) -> Result<()> {
        let variables_json = serde_json::to_string(&template.variables)?;
        let now = Utc::now();

        if let Some(id) = template.id {
            sqlx::query(
                r"
                UPDATE templates SET
                    name = ?, subject = ?, html_body = ?, text_body = ?,
                    variables = ?, is_active = ?, updated_at = ?
                WHERE id = ?
                ",
            )
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.html_body)
            .bind(&template.text_body)
            .bind(&variables_json)
            .bind(template.is_active)
            .bind(now.to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        } else {
            let result = sqlx::query(
                r"
                INSERT INTO templates
                    (name, subject, html_body, text_body, variables, is_active,
                     created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.html_body)
            .bind(&template.text_body)
            .bind(&variables_json)
            .bind(template.is_active)
            .bind(template.created_at.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;

            template.id = Some(TemplateId::new(result.last_insert_rowid()));
        }

        template.updated_at = now;
        debug!("saved template {:?} ({})", template.id, template.name);
        Ok(())
    }

    /// Retire a template from new campaigns without deleting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or the query fails.
    pub async fn deactivate(&self, id: TemplateId) -> Result<()> {
        let result = sqlx::query("UPDATE templates SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TemplateNotFound(id));
        }
        Ok(())
    }

    /// Delete a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or the query fails.
    pub async fn delete(&self, id: TemplateId) -> Result<()> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TemplateNotFound(id));
        }
        Ok(())
    }
}

/// Create the templates table if it doesn't exist.
///
/// Shared with the campaign repository, whose create path reads template
/// rows from the same database.
pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            subject TEXT NOT NULL,
            html_body TEXT NOT NULL,
            text_body TEXT,
            variables TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Convert a database row to a Template.
///
/// The stored `variables` text is normalized here, once, at the boundary:
/// old rows carry comma-separated or JSON-encoded text and must come back as
/// the same canonical list a current row does. Rows with unparseable
/// timestamps are dropped.
fn row_to_template(row: &sqlx::sqlite::SqliteRow) -> Option<Template> {
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");
    let created_at = parse_timestamp(&created_at_str)?;
    let updated_at = parse_timestamp(&updated_at_str)?;

    let raw_variables: String = row.get("variables");
    let variables = RawConstants::Text(raw_variables).into_canonical();

    Some(Template {
        id: Some(TemplateId::new(row.get("id"))),
        name: row.get("name"),
        subject: row.get("subject"),
        html_body: row.get("html_body"),
        text_body: row.get("text_body"),
        variables,
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_template() -> Template {
        let mut template = Template::new(
            "Weekly promo",
            "{{company_name}} weekly deals",
            "<p>Hi {{subscriber_username}}, use {{offer_code}}</p>",
        );
        template.variables = vec![
            "company_name".to_string(),
            "subscriber_username".to_string(),
            "offer_code".to_string(),
        ];
        template
    }

    #[tokio::test]
    async fn test_save_and_retrieve() {
        let repo = TemplateRepository::in_memory().await.unwrap();

        let mut template = sample_template();
        repo.save(&mut template).await.unwrap();
        assert!(template.id.is_some());

        let retrieved = repo.get(template.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(retrieved.name, "Weekly promo");
        assert_eq!(
            retrieved.variables,
            ["company_name", "subscriber_username", "offer_code"]
        );
        assert!(retrieved.is_active);
    }

    #[tokio::test]
    async fn test_list_orders_by_recent_update() {
        let repo = TemplateRepository::in_memory().await.unwrap();

        let mut first = sample_template();
        repo.save(&mut first).await.unwrap();

        let mut second = Template::new("Announcement", "News", "<p>News</p>");
        repo.save(&mut second).await.unwrap();

        // Touching the first template makes it the most recent.
        first.name = "Weekly promo v2".to_string();
        repo.save(&mut first).await.unwrap();

        let templates = repo.list().await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "Weekly promo v2");
    }

    #[tokio::test]
    async fn test_legacy_variable_encodings_are_normalized() {
        let repo = TemplateRepository::in_memory().await.unwrap();
        let now = Utc::now().to_rfc3339();

        // Oldest rows stored a comma-separated declaration.
        sqlx::query(
            "INSERT INTO templates (name, subject, html_body, variables, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("Legacy CSV")
        .bind("Subject")
        .bind("<p>Body</p>")
        .bind("offer_code, price , offer_code")
        .bind(&now)
        .bind(&now)
        .execute(&repo.pool)
        .await
        .unwrap();

        // Later rows stored JSON array text.
        sqlx::query(
            "INSERT INTO templates (name, subject, html_body, variables, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("Legacy JSON")
        .bind("Subject")
        .bind("<p>Body</p>")
        .bind(r#"["link","price"]"#)
        .bind(&now)
        .bind(&now)
        .execute(&repo.pool)
        .await
        .unwrap();

        let templates = repo.list().await.unwrap();
        let csv = templates.iter().find(|t| t.name == "Legacy CSV").unwrap();
        assert_eq!(csv.variables, ["offer_code", "price"]);
        let json = templates.iter().find(|t| t.name == "Legacy JSON").unwrap();
        assert_eq!(json.variables, ["link", "price"]);
    }

    #[tokio::test]
    async fn test_deactivate() {
        let repo = TemplateRepository::in_memory().await.unwrap();

        let mut template = sample_template();
        repo.save(&mut template).await.unwrap();
        let id = template.id.unwrap();

        repo.deactivate(id).await.unwrap();
        let retrieved = repo.get(id).await.unwrap().unwrap();
        assert!(!retrieved.is_active);
    }

    #[tokio::test]
    async fn test_delete_missing_template_errors() {
        let repo = TemplateRepository::in_memory().await.unwrap();
        let result = repo.delete(TemplateId::new(999)).await;
        assert!(matches!(result, Err(Error::TemplateNotFound(_))));
    }
}
