use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::access::Session;
use crate::cli::{utils, OutputFormat};
use crate::services::AssignmentService;

#[derive(Args)]
pub struct AssignmentArgs {
    #[arg(help = "Psychiatrist user id")]
    pub psychiatrist_id: Uuid,

    #[arg(help = "Patient user id")]
    pub patient_id: Uuid,
}

pub async fn handle_assign(args: AssignmentArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = utils::connect_state().await?;
    let assignment = AssignmentService::new(&state, Session::operator())
        .assign(args.psychiatrist_id, args.patient_id)
        .await?;

    utils::output_success(
        &output_format,
        &format!("Assigned {} to {}", args.patient_id, args.psychiatrist_id),
        Some(json!({ "assignment": assignment })),
    )
}

pub async fn handle_unassign(args: AssignmentArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = utils::connect_state().await?;
    let removed = AssignmentService::new(&state, Session::operator())
        .unassign(args.psychiatrist_id, args.patient_id)
        .await?;

    if removed == 0 {
        return utils::output_success(&output_format, "No such assignment", Some(json!({ "deleted": 0 })));
    }
    utils::output_success(
        &output_format,
        &format!("Unassigned {} from {}", args.patient_id, args.psychiatrist_id),
        Some(json!({ "deleted": removed })),
    )
}
