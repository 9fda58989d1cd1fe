use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils, OutputFormat};

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "User id the token is issued for")]
    pub user_id: Uuid,

    #[arg(help = "Email carried in the token")]
    pub email: String,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = Claims::new(args.user_id, args.email);
    let token = generate_jwt(&claims)?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => utils::output_success(
            &output_format,
            "Token issued",
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
    }
}
