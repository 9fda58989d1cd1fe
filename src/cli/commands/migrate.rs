use anyhow::Context;
use clap::Args;
use serde_json::json;
use sqlx::Executor;

use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

#[derive(Args)]
pub struct MigrateArgs {
    #[arg(long, help = "Print the schema instead of applying it")]
    pub dry_run: bool,
}

pub async fn handle(args: MigrateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if args.dry_run {
        println!("{}", SCHEMA);
        return Ok(());
    }

    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to Postgres (is DATABASE_URL set?)")?;

    // Statements are idempotent (IF NOT EXISTS), so re-running is safe
    pool.execute(SCHEMA).await.context("failed to apply schema")?;
    tracing::info!("Applied bundled schema");

    utils::output_success(
        &output_format,
        "Schema applied",
        Some(json!({ "statements": SCHEMA.matches(';').count() })),
    )
}
