pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "roll")]
#[command(about = "roll - operator CLI for the shareholder meeting API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server URL (overrides saved config)")]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Bearer token (overrides saved config)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show or change saved server and token")]
    Config {
        #[command(subcommand)]
        cmd: commands::config::ConfigCommands,
    },

    #[command(about = "Check server and database health")]
    Health,

    #[command(about = "Browse shareholders")]
    Shareholders {
        #[command(subcommand)]
        cmd: commands::shareholders::ShareholderCommands,
    },

    #[command(about = "Check in a shareholder, or undo a check-in")]
    Checkin(commands::checkin::CheckinArgs),

    #[command(about = "Read or change a shareholder's designee")]
    Designee {
        #[command(subcommand)]
        cmd: commands::designee::DesigneeCommands,
    },

    #[command(about = "Meeting listing and live attendance")]
    Meetings {
        #[command(subcommand)]
        cmd: commands::meetings::MeetingCommands,
    },

    #[command(about = "Administrative operations (admin token required)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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
    let Cli { command, server, token, .. } = cli;

    let client = match command {
        Commands::Config { cmd } => return commands::config::handle(cmd, output_format),
        _ => {
            let saved = config::load_config()?;
            ApiClient::new(saved.server_url(server.as_deref()), saved.token(token.as_deref()))?
        }
    };

    match command {
        Commands::Config { .. } => Ok(()),
        Commands::Health => commands::health::handle(&client, output_format).await,
        Commands::Shareholders { cmd } => commands::shareholders::handle(cmd, &client, output_format).await,
        Commands::Checkin(args) => commands::checkin::handle(args, &client, output_format).await,
        Commands::Designee { cmd } => commands::designee::handle(cmd, &client, output_format).await,
        Commands::Meetings { cmd } => commands::meetings::handle(cmd, &client, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, &client, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::admin::AdminCommands;
    use commands::checkin::CheckinCommands;
    use commands::designee::DesigneeCommands;

    #[test]
    fn parses_checkin_with_signature() {
        let cli = Cli::try_parse_from(["roll", "checkin", "S-100", "--signature", "A. Smith"]).unwrap();
        match cli.command {
            Commands::Checkin(args) => {
                assert!(args.cmd.is_none());
                assert_eq!(args.shareholder_id.as_deref(), Some("S-100"));
                assert_eq!(args.signature.as_deref(), Some("A. Smith"));
            }
            _ => panic!("expected checkin"),
        }
    }

    #[test]
    fn parses_checkin_undo() {
        let cli = Cli::try_parse_from(["roll", "checkin", "undo", "S-100"]).unwrap();
        match cli.command {
            Commands::Checkin(args) => {
                assert!(matches!(args.cmd, Some(CheckinCommands::Undo { ref shareholder_id }) if shareholder_id == "S-100"));
            }
            _ => panic!("expected checkin"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["roll", "designee", "set", "S-1", "Pat Quinn", "--json", "--server", "http://x:1"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert_eq!(cli.server.as_deref(), Some("http://x:1"));
        assert!(matches!(cli.command, Commands::Designee { cmd: DesigneeCommands::Set { .. } }));
    }

    #[test]
    fn reset_checkins_parses_yes_flag() {
        let cli = Cli::try_parse_from(["roll", "admin", "reset-checkins"]).unwrap();
        assert!(matches!(cli.command, Commands::Admin { cmd: AdminCommands::ResetCheckins { yes: false } }));
        let cli = Cli::try_parse_from(["roll", "admin", "reset-checkins", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Admin { cmd: AdminCommands::ResetCheckins { yes: true } }));
    }

    #[test]
    fn text_is_the_default_output() {
        let cli = Cli::try_parse_from(["roll", "health"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
