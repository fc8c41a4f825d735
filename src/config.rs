use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::models::Policy;

/// `<data dir>/show-listings`, or the working directory when none exists.
static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("show-listings")
});

pub fn default_database_path() -> PathBuf {
    DATA_ROOT.join("show-listings.sqlite")
}

pub fn default_config_path() -> PathBuf {
    DATA_ROOT.join("config.json")
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Rest,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "rest" => Ok(Backend::Rest),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub database_path: Option<PathBuf>,
    pub rest_url: Option<String>,
    pub rest_api_key: Option<String>,
    pub require_ordered_range: bool,
    pub reject_past_dates: bool,
}

impl AppConfig {
    pub fn policy(&self) -> Policy {
        Policy {
            require_ordered_range: self.require_ordered_range,
            reject_past_dates: self.reject_past_dates,
        }
    }

    /// Environment variables win over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(backend) = env_var("LISTINGS_BACKEND").and_then(|v| v.parse().ok()) {
            self.backend = backend;
        }
        if let Some(path) = env_var("LISTINGS_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(url) = env_var("LISTINGS_REST_URL") {
            self.rest_url = Some(url);
        }
        if let Some(key) = env_var("LISTINGS_REST_KEY") {
            self.rest_api_key = Some(key);
        }
        self
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring unreadable config {:?}: {err}", path);
                AppConfig::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig, String>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| "config mutex poisoned".to_string())?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    let contents = serde_json::to_string_pretty(config).map_err(|err| err.to_string())?;
    fs::write(path, contents).map_err(|err| err.to_string())
}
