use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_RADIO: &str = "98.7 FM, 107.1 FM, 710 AM, Sirius XM";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Team whose thread is being updated; the CLI argument is then the opponent.
    pub home_team: Option<String>,
    pub radio_stations: String,
    pub api_web_base: String,
    pub stats_api_base: String,
    pub lineups_base: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub schedule_lookahead_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_team: Some("NYR".to_string()),
            radio_stations: DEFAULT_RADIO.to_string(),
            api_web_base: "https://api-web.nhle.com".to_string(),
            stats_api_base: "https://api.nhle.com".to_string(),
            lineups_base: "https://www.dailyfaceoff.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            retries: 1,
            retry_delay_ms: 500,
            schedule_lookahead_days: 60,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/nhl-gdt/config.json`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "gdt", "nhl-gdt").map(|p| p.config_dir().join("config.json"))
    }

    /// Load from an explicit path, or from the default location when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(p) if p.exists() => Self::load_from(&p),
            _ => Ok(AppConfig::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        let config: AppConfig = serde_json::from_str(content.trim_start_matches('\u{feff}'))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(config_path) = Self::default_path() {
            if let Some(dir) = config_path.parent() {
                fs::create_dir_all(dir)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(config_path, content)?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
