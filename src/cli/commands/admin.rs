use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create any missing tables and indexes")]
    Schema,

    #[command(about = "Clear every check-in and signature")]
    ResetCheckins {
        #[arg(long, help = "Confirm the reset")]
        yes: bool,
    },
}

pub async fn handle(cmd: AdminCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Schema => {
            let body = client.post("/api/admin/schema", None).await?;
            let count = body.get("ensured").and_then(Value::as_array).map_or(0, Vec::len);
            output_success(output_format, &format!("Schema ready ({} objects)", count), Some(body))
        }
        AdminCommands::ResetCheckins { yes } => {
            if !yes {
                anyhow::bail!("refusing to reset every check-in without --yes");
            }
            let body = client.post("/api/admin/checkins/reset", None).await?;
            let reset = body.get("propertiesReset").and_then(Value::as_u64).unwrap_or(0);
            output_success(output_format, &format!("Reset {} property check-ins", reset), Some(body))
        }
    }
}
