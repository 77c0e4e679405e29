use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_value, text, yes_no};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum MeetingCommands {
    #[command(about = "List meetings, newest first")]
    List,

    #[command(about = "Live attendance for a meeting")]
    Stats {
        #[arg(help = "Meeting id")]
        id: i32,
    },
}

pub async fn handle(cmd: MeetingCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MeetingCommands::List => {
            let body = client.get("/api/meetings").await?;
            output_value(output_format, &body, |body| {
                let meetings = body.as_array().cloned().unwrap_or_default();
                if meetings.is_empty() {
                    println!("No meetings");
                    return;
                }
                println!("{:>4} {:>6} {:<12} {:>8} {:>8} {:<4}", "ID", "YEAR", "DATE", "HOLDERS", "IN", "DATA");
                for meeting in &meetings {
                    println!(
                        "{:>4} {:>6} {:<12} {:>8} {:>8} {:<4}",
                        text(meeting, "id"),
                        text(meeting, "year"),
                        text(meeting, "date"),
                        text(meeting, "totalShareholders"),
                        text(meeting, "checkedInCount"),
                        yes_no(meeting, "hasInitialData")
                    );
                }
            })
        }
        MeetingCommands::Stats { id } => {
            let body = client.get(&format!("/api/meetings/{}/stats", id)).await?;
            output_value(output_format, &body, render_stats)
        }
    }
}

fn render_stats(body: &Value) {
    println!(
        "Shareholders: {} of {} checked in",
        text(body, "checkedInShareholders"),
        text(body, "totalShareholders")
    );
    println!(
        "Properties:   {} of {} checked in",
        text(body, "checkedInProperties"),
        text(body, "totalProperties")
    );
}
