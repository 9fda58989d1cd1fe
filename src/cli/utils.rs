use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgStore};
use crate::state::AppState;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Postgres-backed state for commands that write through the services
pub async fn connect_state() -> anyhow::Result<AppState> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to Postgres (is DATABASE_URL set?)")?;
    Ok(AppState::new(Arc::new(PgStore::new(pool))))
}
