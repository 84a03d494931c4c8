use crate::error::{DiaryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const BEARER_ENV: &str = "TMDB_BEARER";
pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const DATA_FILE_ENV: &str = "DIARY_DATA_FILE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb_bearer: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub language: String,
    pub timeout_seconds: u64,
    pub data_file: Option<PathBuf>,
    /// Titles listed by `backfill` before collapsing into "... and N more"
    pub missing_report_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_bearer: None,
            tmdb_api_key: None,
            language: "en-US".into(),
            timeout_seconds: 20,
            data_file: None,
            missing_report_limit: 20,
        }
    }
}

/// How requests to TMDb authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// v4 read access token, sent as `Authorization: Bearer`
    Bearer(String),
    /// v3 key, sent as the `api_key` query parameter
    ApiKey(String),
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DiaryError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("media-diary").join("config.json"))
    }

    /// Diary data file: `DIARY_DATA_FILE`, then the config value, then the
    /// platform data directory.
    pub fn data_file(&self) -> Result<PathBuf> {
        if let Some(path) = env_value(DATA_FILE_ENV) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| DiaryError::Config("data directory not found".into()))?;
        Ok(base.join("media-diary").join("diary.json"))
    }

    /// Resolve TMDb credentials. Environment variables win over the file,
    /// and a bearer token wins over an API key.
    pub fn credentials(&self) -> Result<Credentials> {
        resolve_credentials(
            env_value(BEARER_ENV).or_else(|| self.tmdb_bearer.clone()),
            env_value(API_KEY_ENV).or_else(|| self.tmdb_api_key.clone()),
        )
    }

    pub fn set_bearer(&mut self, token: String) -> Result<()> {
        self.tmdb_bearer = Some(token);
        self.save()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.tmdb_api_key = Some(key);
        self.save()
    }
}

fn resolve_credentials(bearer: Option<String>, api_key: Option<String>) -> Result<Credentials> {
    let bearer = bearer.filter(|v| !v.trim().is_empty());
    let api_key = api_key.filter(|v| !v.trim().is_empty());

    match (bearer, api_key) {
        (Some(token), _) => Ok(Credentials::Bearer(token)),
        (None, Some(key)) => Ok(Credentials::ApiKey(key)),
        (None, None) => Err(DiaryError::MissingApiKey),
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
