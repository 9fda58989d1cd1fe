pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "habitual")]
#[command(about = "Habitual CLI - operator tooling for the habitual API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply the bundled schema to DATABASE_URL")]
    Migrate(commands::migrate::MigrateArgs),

    #[command(about = "Mint a development token for a user")]
    Token(commands::token::TokenArgs),

    #[command(about = "Set a user's role, creating the profile if needed")]
    Role(commands::role::RoleArgs),

    #[command(about = "Assign a patient to a psychiatrist")]
    Assign(commands::assign::AssignmentArgs),

    #[command(about = "Remove a psychiatrist/patient assignment")]
    Unassign(commands::assign::AssignmentArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate(args) => commands::migrate::handle(args, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format).await,
        Commands::Role(args) => commands::role::handle(args, output_format).await,
        Commands::Assign(args) => commands::assign::handle_assign(args, output_format).await,
        Commands::Unassign(args) => commands::assign::handle_unassign(args, output_format).await,
    }
}
