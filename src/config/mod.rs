use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_acquire_timeout", with = "duration_serde::duration")]
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

/// Progress engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Upper bound for any single storage call made by the engine
    #[serde(default = "default_storage_timeout", with = "duration_serde::duration")]
    pub storage_timeout: Duration,
    /// Per-stage schema overrides. Empty means the built-in table
    /// (8 stages, 6 subtasks each, every subtask date-bearing).
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

/// One stage entry of the schema override table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub subtask_count: u8,
    /// 1-based indices carrying planned/realized dates; `None` means all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dated_subtasks: Option<Vec<u8>>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            storage_timeout: default_storage_timeout(),
            stages: Vec::new(),
        }
    }
}

// Database defaults
fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS)
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

// Progress defaults
fn default_storage_timeout() -> Duration {
    Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: Some(DEFAULT_MAX_CONNECTIONS),
                connect_timeout: default_connect_timeout(),
                acquire_timeout: default_acquire_timeout(),
            },
            web: WebConfig {
                host: default_host(),
                port: default_port(),
                request_timeout: default_request_timeout(),
            },
            progress: ProgressConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration layered as defaults, then the TOML file, then
    /// `KEGIATAN_TAHAP__SECTION__KEY` environment variables.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !std::path::Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)
                .with_context(|| format!("Failed to write default config to {config_file}"))?;
            info!("Created default config file: {}", config_file);
        }

        Self::figment(config_file)
            .extract()
            .with_context(|| format!("Failed to load configuration from {config_file}"))
    }

    fn figment(config_file: &str) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
