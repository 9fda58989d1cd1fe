use chrono::Utc;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::access::{AccessError, Session};
use crate::cli::{utils, OutputFormat};
use crate::database::models::{Profile, Role};
use crate::database::Repository;
use crate::services::ProfileService;

#[derive(Args)]
pub struct RoleArgs {
    #[arg(help = "User id whose role changes")]
    pub user_id: Uuid,

    #[arg(help = "New role: user, psychiatrist or admin")]
    pub role: Role,

    #[arg(long, help = "Email for a profile that does not exist yet")]
    pub email: Option<String>,
}

pub async fn handle(args: RoleArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = utils::connect_state().await?;
    let service = ProfileService::new(&state, Session::operator());

    let profile = match service.update_user_role(args.user_id, args.role).await {
        Ok(profile) => profile,
        Err(AccessError::NotFound(_)) => {
            let Some(email) = args.email else {
                utils::output_error(&output_format, "No profile for that user; pass --email to create one", Some("NOT_FOUND"))?;
                anyhow::bail!("profile {} not found", args.user_id);
            };
            Repository::<Profile>::new(state.store.clone())
                .insert(&json!({
                    "id": args.user_id,
                    "email": email,
                    "role": args.role,
                    "created_at": Utc::now(),
                }))
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    utils::output_success(
        &output_format,
        &format!("{} is now {}", profile.email, profile.role),
        Some(json!({ "profile": profile })),
    )
}
