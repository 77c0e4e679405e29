use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_value, segment, text, yes_no};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ShareholderCommands {
    #[command(about = "List shareholders, one page at a time")]
    List {
        #[arg(long, help = "Match name or shareholder id")]
        search: Option<String>,
        #[arg(long, help = "Only checked-in (true) or not checked-in (false)")]
        checked_in: Option<bool>,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        page_size: Option<i64>,
    },

    #[command(about = "Show one shareholder with their properties")]
    Show {
        #[arg(help = "Shareholder id")]
        shareholder_id: String,
    },
}

pub async fn handle(cmd: ShareholderCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ShareholderCommands::List { search, checked_in, page, page_size } => {
            let path = list_path(search.as_deref(), checked_in, page, page_size);
            let body = client.get(&path).await?;
            output_value(output_format, &body, render_page)
        }
        ShareholderCommands::Show { shareholder_id } => {
            let body = client.get(&format!("/api/shareholders/{}", segment(&shareholder_id))).await?;
            output_value(output_format, &body, render_detail)
        }
    }
}

fn list_path(search: Option<&str>, checked_in: Option<bool>, page: i64, page_size: Option<i64>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    if let Some(size) = page_size {
        query.append_pair("pageSize", &size.to_string());
    }
    if let Some(term) = search {
        query.append_pair("search", term);
    }
    if let Some(flag) = checked_in {
        query.append_pair("checkedIn", if flag { "true" } else { "false" });
    }
    format!("/api/shareholders?{}", query.finish())
}

fn render_page(body: &Value) {
    let items = body.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
    if items.is_empty() {
        println!("No shareholders found");
        return;
    }

    println!("{:<14} {:<36} {:>5} {:<3}", "ID", "NAME", "PROPS", "IN");
    for row in &items {
        println!(
            "{:<14} {:<36} {:>5} {:<3}",
            text(row, "shareholderId"),
            text(row, "name"),
            text(row, "propertyCount"),
            yes_no(row, "checkedIn")
        );
    }
    println!("Page {} of {} ({} total)", text(body, "page"), text(body, "totalPages"), text(body, "total"));
}

fn render_detail(body: &Value) {
    println!("{} - {}", text(body, "shareholderId"), text(body, "name"));
    println!("Checked in: {}", yes_no(body, "checkedIn"));
    println!("Designee:   {}", text(body, "designee"));
    println!("Comment:    {}", text(body, "comment"));

    let properties = body.get("properties").and_then(Value::as_array).cloned().unwrap_or_default();
    println!("Properties ({}):", properties.len());
    for property in &properties {
        println!("  {:<12} {:<40} {}", text(property, "account"), text(property, "serviceAddress"), yes_no(property, "checkedIn"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_path_carries_filters() {
        assert_eq!(list_path(None, None, 1, None), "/api/shareholders?page=1");
        assert_eq!(
            list_path(Some("Alder Farms"), Some(true), 2, Some(25)),
            "/api/shareholders?page=2&pageSize=25&search=Alder+Farms&checkedIn=true"
        );
    }
}
