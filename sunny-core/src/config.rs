use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.caiyunapp.com/";
pub const DEFAULT_LANG: &str = "zh_CN";

/// Connection settings for the remote weather service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Static credential embedded in every request.
    pub token: Option<String>,

    /// Language of place names and addresses in search results.
    pub lang: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), token: None, lang: DEFAULT_LANG.to_string() }
    }
}

impl ApiConfig {
    /// Returns the token or a hint on how to configure one.
    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API token configured.\n\
                 Hint: run `sunny configure` and enter your token."
            )
        })
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [api]
/// base_url = "https://api.caiyunapp.com/"
/// token = "..."
/// lang = "zh_CN"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Where the selected place is kept. Defaults to the platform data dir.
    pub store_path: Option<PathBuf>,

    pub api: ApiConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the selected-place record.
    pub fn place_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("place.json")),
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.api.token = Some(token);
    }

    pub fn is_configured(&self) -> bool {
        self.api.token().is_ok()
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "sunny-weather", "sunny")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}
