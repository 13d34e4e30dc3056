#![allow(clippy::expect_used, clippy::uninlined_format_args)]
//! Example: drive the campaign wizard end to end.
//!
//! Creates an in-memory database, authors a template, walks the four wizard
//! steps, prints the review preview, and submits the campaign.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=debug cargo run --package sendloom-core --example campaign_wizard
//! ```

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use sendloom_core::{
    CampaignMetadata, CampaignRepository, CampaignWizard, Template, TemplateRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let templates = TemplateRepository::with_pool(pool.clone()).await?;
    let campaigns = CampaignRepository::with_pool(pool).await?;

    // Author a template. Declared variables are taken straight from the
    // placeholders found in the subject and body.
    let mut template = Template::new(
        "Weekly deals",
        "{{company_name}} deals are here",
        "<p>Hi {{subscriber_username}},</p>\n<p>Use {{offer_code}} for {{discount}} off.</p>",
    );
    template.variables = template.scanned_variables();
    templates.save(&mut template).await?;

    // Walk the wizard: select, fill constants, set metadata, review.
    let mut wizard = CampaignWizard::new(templates.list().await?);
    wizard.select_template(template.id.expect("saved template has an id"))?;
    wizard.advance();

    wizard.set_custom_value("offer_code", "SAVE20");
    wizard.set_custom_value("discount", "20%");
    wizard.advance();

    wizard.set_metadata(CampaignMetadata {
        name: "June deals".to_string(),
        scheduled_for: Some(Utc::now() + Duration::hours(6)),
        display_timezone: "UTC".to_string(),
    });
    wizard.advance();

    println!("Step: {}", wizard.step().display_name());
    println!(
        "Preview:\n{}\n",
        wizard.preview().expect("review step has a preview")
    );

    match wizard.submit(&campaigns).await {
        Some(campaign) => println!(
            "Created campaign {} ({}) scheduled for {:?}",
            campaign.id, campaign.status, campaign.scheduled_for
        ),
        None => eprintln!("Submission failed: {:?}", wizard.errors()),
    }

    Ok(())
}
