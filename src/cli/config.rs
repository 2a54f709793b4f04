use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Persistent CLI settings (`cli.json` in the config directory)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub server: Option<String>,
    pub notes_file: Option<PathBuf>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("SSL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("church-ssl")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_cli_config() -> anyhow::Result<CliConfig> {
    let config_file = get_config_dir()?.join("cli.json");

    if !config_file.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: CliConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_cli_config(config: &CliConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("cli.json");

    let mut config = config.clone();
    config.updated_at = Some(Utc::now());
    let content = serde_json::to_string_pretty(&config)?;
    fs::write(config_file, content)?;
    Ok(())
}

/// Server URL: explicit flag or `SSL_SERVER`, then the saved setting, then localhost
pub fn resolve_server(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(server) = flag.filter(|s| !s.trim().is_empty()) {
        return Ok(server);
    }
    Ok(load_cli_config()?.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()))
}

/// Note book location: saved setting or `notes.json` in the config directory
pub fn notes_path() -> anyhow::Result<PathBuf> {
    match load_cli_config()?.notes_file {
        Some(path) => Ok(path),
        None => Ok(get_config_dir()?.join("notes.json")),
    }
}

pub async fn ping_server(server: &str) -> bool {
    let client = reqwest::Client::new();
    let url = format!("{}/health", server.trim_end_matches('/'));

    match client.get(&url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
