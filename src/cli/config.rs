use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Saved CLI settings (`config.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    pub server_url: Option<String>,
    pub token: Option<String>,
}

impl CliConfig {
    /// Flag, then saved value, then the local default
    pub fn server_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn token(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.token.clone())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("ROLL_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("roll")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_config() -> anyhow::Result<CliConfig> {
    let file = get_config_dir()?.join("config.json");
    if !file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let file = get_config_dir()?.join("config.json");
    let content = serde_json::to_string_pretty(config)?;
    fs::write(file, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_saved_value_beats_default() {
        let saved = CliConfig { server_url: Some("https://roll.district.example/".into()), token: Some("saved".into()) };
        assert_eq!(saved.server_url(None), "https://roll.district.example");
        assert_eq!(saved.server_url(Some("http://127.0.0.1:9000")), "http://127.0.0.1:9000");
        assert_eq!(CliConfig::default().server_url(None), DEFAULT_SERVER_URL);

        assert_eq!(saved.token(None).as_deref(), Some("saved"));
        assert_eq!(saved.token(Some("flag")).as_deref(), Some("flag"));
        assert_eq!(CliConfig::default().token(None), None);
    }

    #[test]
    fn config_file_is_camel_case() {
        let json = serde_json::to_value(CliConfig { server_url: Some("http://a".into()), token: None }).unwrap();
        assert_eq!(json["serverUrl"], "http://a");
    }
}
