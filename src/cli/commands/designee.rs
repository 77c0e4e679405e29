use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_success, output_value, segment};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum DesigneeCommands {
    #[command(about = "Show the designee")]
    Get {
        #[arg(help = "Shareholder id")]
        shareholder_id: String,
    },

    #[command(about = "Set the designee")]
    Set {
        #[arg(help = "Shareholder id")]
        shareholder_id: String,
        #[arg(help = "Name of the person voting on their behalf")]
        designee: String,
    },

    #[command(about = "Remove the designee")]
    Clear {
        #[arg(help = "Shareholder id")]
        shareholder_id: String,
    },
}

fn path(shareholder_id: &str) -> String {
    format!("/api/shareholders/{}/designee", segment(shareholder_id))
}

pub async fn handle(cmd: DesigneeCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DesigneeCommands::Get { shareholder_id } => {
            let body = client.get(&path(&shareholder_id)).await?;
            output_value(output_format, &body, |body| match body.get("designee").and_then(Value::as_str) {
                Some(name) => println!("{}", name),
                None => println!("No designee for {}", shareholder_id),
            })
        }
        DesigneeCommands::Set { shareholder_id, designee } => {
            let body = client.put(&path(&shareholder_id), json!({ "designee": designee })).await?;
            output_success(output_format, &format!("Designee set for {}", shareholder_id), Some(body))
        }
        DesigneeCommands::Clear { shareholder_id } => {
            let body = client.delete(&path(&shareholder_id)).await?;
            output_success(output_format, &format!("Designee cleared for {}", shareholder_id), Some(body))
        }
    }
}
