//! TOML configuration
//!
//! Looked up as `config.toml` in `$XDG_CONFIG_HOME/navi-rs/`, then
//! `$HOME/.config/navi-rs/`, then the working directory. The `[server]`
//! section is required; everything else has defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "navi-rs";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_progress_bar_width")]
    pub progress_bar_width: usize,
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerConfig {
    /// Seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,
    #[serde(default = "default_mpv_path")]
    pub mpv_path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_client_id")]
    pub id: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_page_size() -> usize {
    20
}

fn default_progress_bar_width() -> usize {
    30
}

fn default_max_column_width() -> usize {
    40
}

fn default_http_timeout() -> u64 {
    30
}

fn default_mpv_path() -> String {
    "mpv".to_string()
}

fn default_client_id() -> String {
    "navi-rs".to_string()
}

fn default_api_version() -> String {
    "1.16.1".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            progress_bar_width: default_progress_bar_width(),
            max_column_width: default_max_column_width(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            http_timeout: default_http_timeout(),
            mpv_path: default_mpv_path(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            id: default_client_id(),
            api_version: default_api_version(),
        }
    }
}

impl Config {
    /// Load the first config file found in the search path.
    pub fn load() -> Result<Self> {
        let candidates = Self::candidate_paths();
        let path = candidates.iter().find(|p| p.is_file()).with_context(|| {
            let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            format!("no {CONFIG_FILE} found (searched: {})", searched.join(", "))
        })?;
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR).join(CONFIG_FILE));
        }
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".config").join(APP_DIR).join(CONFIG_FILE);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths.push(PathBuf::from(CONFIG_FILE));
        paths
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("server.url", &self.server.url),
            ("server.username", &self.server.username),
            ("server.password", &self.server.password),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("missing required config key: {key}");
            }
        }
        if self.ui.page_size == 0 {
            bail!("ui.page_size must be at least 1");
        }
        Ok(())
    }
}
