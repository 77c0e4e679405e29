use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{get_config_dir, load_config, save_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show saved settings")]
    Show,

    #[command(about = "Save the API server URL")]
    SetServer {
        #[arg(help = "Server URL, e.g. https://roll.example.org")]
        url: String,
    },

    #[command(about = "Save the bearer token used for API calls")]
    SetToken {
        #[arg(help = "Token issued by the identity provider")]
        token: String,
    },
}

pub fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config()?;

    match cmd {
        ConfigCommands::Show => {
            let dir = get_config_dir()?;
            match output_format {
                OutputFormat::Json => {
                    let shown = json!({
                        "configDir": dir.display().to_string(),
                        "serverUrl": config.server_url(None),
                        "tokenSet": config.token.is_some(),
                    });
                    println!("{}", serde_json::to_string_pretty(&shown)?);
                }
                OutputFormat::Text => {
                    println!("Config dir: {}", dir.display());
                    println!("Server:     {}", config.server_url(None));
                    println!("Token:      {}", if config.token.is_some() { "set" } else { "not set" });
                }
            }
            Ok(())
        }
        ConfigCommands::SetServer { url } => {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("Server URL must start with http:// or https://");
            }
            config.server_url = Some(url.clone());
            save_config(&config)?;
            output_success(output_format, &format!("Server set to {}", url), Some(json!({ "serverUrl": url })))
        }
        ConfigCommands::SetToken { token } => {
            let token = token.trim().to_string();
            if token.is_empty() {
                anyhow::bail!("Token must not be empty");
            }
            config.token = Some(token);
            save_config(&config)?;
            output_success(output_format, "Token saved", None)
        }
    }
}
