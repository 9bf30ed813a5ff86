mod commands;
mod logger;

use clap::{Parser, Subcommand};
use shared::{IssueStatus, IssueType};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pracas", version, about = "Mapa de problemas urbanos da comunidade")]
#[command(after_help = "Environment:
  PRACAS_API_URL    Backend base URL
  PRACAS_TOKEN      Bearer access token
  PRACAS_LAT/LNG    Device position
  PRACAS_LOG_DIR    Rolling log directory")]
pub struct Cli {
    /// Backend base URL (overrides PRACAS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer access token (overrides PRACAS_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug logging
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every issue
    List,

    /// Issues around a point (defaults to the device position)
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Full detail of an issue
    Show { id: i64 },

    /// Report a new issue
    Report {
        #[arg(long)]
        titulo: String,
        #[arg(long)]
        descricao: String,
        /// Issue type (BURACO, ILUMINACAO, LIXO, ...)
        #[arg(long)]
        tipo: IssueType,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Photo to attach (previewed locally, not uploaded)
        #[arg(long)]
        foto: Option<PathBuf>,
    },

    /// Support an issue
    Support { id: i64 },

    /// Comment on an issue
    Comment { id: i64, texto: String },

    /// Interactions of an issue
    Interactions { id: i64 },

    /// Remove an interaction
    Uncomment { id: i64, interaction_id: i64 },

    /// Change the status of an issue
    Status { id: i64, status: IssueStatus },

    /// Show the map around the device position
    Map {
        /// Deep link (`?lat=..&lng=..&issueId=..`)
        #[arg(long)]
        link: Option<String>,
    },

    /// Who the configured token belongs to
    Whoami,

    /// Issue types and statuses
    Types,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = pracas_client::ClientConfig::from_env();
    let log_dir = std::env::var("PRACAS_LOG_DIR").ok();
    logger::init_logger(cli.verbose, log_dir.as_deref());

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("erro: {e}");
            ExitCode::FAILURE
        }
    }
}
