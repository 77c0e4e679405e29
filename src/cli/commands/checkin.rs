use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_success, segment};
use crate::cli::OutputFormat;

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct CheckinArgs {
    #[command(subcommand)]
    pub cmd: Option<CheckinCommands>,

    #[arg(help = "Shareholder id to check in")]
    pub shareholder_id: Option<String>,

    #[arg(long, help = "Signature captured at the door")]
    pub signature: Option<String>,
}

#[derive(Subcommand)]
pub enum CheckinCommands {
    #[command(about = "Undo a check-in")]
    Undo {
        #[arg(help = "Shareholder id")]
        shareholder_id: String,
    },
}

pub async fn handle(args: CheckinArgs, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match (args.cmd, args.shareholder_id) {
        (Some(CheckinCommands::Undo { shareholder_id }), _) => {
            let path = format!("/api/shareholders/{}/checkin", segment(&shareholder_id));
            let body = client.delete(&path).await?;
            output_success(output_format, &format!("Check-in undone for {}", shareholder_id), Some(body))
        }
        (None, Some(shareholder_id)) => {
            let path = format!("/api/shareholders/{}/checkin", segment(&shareholder_id));
            let request = args.signature.map(|signature| json!({ "signature": signature }));
            let body = client.post(&path, request).await?;
            output_success(output_format, &format!("{} checked in", shareholder_id), Some(body))
        }
        (None, None) => anyhow::bail!("a shareholder id is required"),
    }
}
