// src/infra/config.rs — Settings loading (YAML)
//
// The settings file is a flat YAML mapping:
//
//   api-key: <personal or global API key>
//   instance: https://dss.example.com     # optional
//   folder: LSE MPIM                      # optional
//   concurrency: 5                        # optional
//   poll-interval-secs: 5                 # optional
//
// Precedence: CLI flags > environment (DSS_API_KEY, DSS_INSTANCE) > file > defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::dss::job::MAX_POLL_INTERVAL;
use crate::infra::errors::SettingsError;

pub const DEFAULT_INSTANCE: &str = "https://dataiku-ops-pp.aiml.gcp.levi.com";
pub const DEFAULT_FOLDER: &str = "LSE MPIM";
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub const API_KEY_ENV: &str = "DSS_API_KEY";
pub const INSTANCE_ENV: &str = "DSS_INSTANCE";

/// Raw contents of the settings file. Every key is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub instance: Option<String>,
    pub folder: Option<String>,
    pub concurrency: Option<usize>,
}

/// Fully resolved configuration used by the commands.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub instance: String,
    pub folder: String,
    pub concurrency: usize,
    pub poll_interval: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("instance", &self.instance)
            .field("folder", &self.folder)
            .field("concurrency", &self.concurrency)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl Settings {
    /// Load settings from `path`, creating an empty file if it is missing.
    ///
    /// An empty file, or one whose top level is not a mapping, yields empty
    /// settings rather than an error.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::File::create(path)?;
            tracing::info!("Created empty settings file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yml::Value = serde_yml::from_str(content)?;
        if !value.is_mapping() {
            return Ok(Self::default());
        }
        serde_yml::from_value(value)
    }

    /// Apply `DSS_API_KEY` / `DSS_INSTANCE` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(instance) = lookup(INSTANCE_ENV).filter(|v| !v.trim().is_empty()) {
            self.instance = Some(instance);
        }
    }
}

impl Config {
    /// Load the settings file at `path`, apply environment and CLI overrides,
    /// and validate the result.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self, SettingsError> {
        let mut settings = Settings::load_from(path)?;
        settings.apply_env_overrides();
        Self::resolve(settings, overrides, path)
    }

    pub fn resolve(
        settings: Settings,
        overrides: &Overrides,
        path: &Path,
    ) -> Result<Self, SettingsError> {
        let api_key = settings
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SettingsError::MissingApiKey {
                path: path.display().to_string(),
            })?;

        let instance = overrides
            .instance
            .clone()
            .or(settings.instance)
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        if let Err(e) = url::Url::parse(&instance) {
            return Err(SettingsError::Invalid {
                key: "instance".into(),
                message: format!("{instance}: {e}"),
            });
        }

        let concurrency = overrides
            .concurrency
            .or(settings.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(SettingsError::Invalid {
                key: "concurrency".into(),
                message: "must be at least 1".into(),
            });
        }

        let poll_secs = settings
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .clamp(1, MAX_POLL_INTERVAL.as_secs());

        Ok(Self {
            api_key,
            instance,
            folder: overrides
                .folder
                .clone()
                .or(settings.folder)
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            concurrency,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}
