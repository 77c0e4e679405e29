use crate::cli::client::ApiClient;
use crate::cli::utils::{output_value, text};
use crate::cli::OutputFormat;

pub async fn handle(client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (healthy, body) = client.health().await?;

    output_value(output_format, &body, |body| {
        println!("Server:   {}", client.base_url());
        println!("Status:   {}", text(body, "status"));
        println!("Database: {}", text(body, "database"));
    })?;

    if !healthy {
        anyhow::bail!("server reports degraded health");
    }
    Ok(())
}
