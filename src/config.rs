//! Configuration management for the Biblio client

use chrono::TimeDelta;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::{
    error::{AppError, AppResult},
    models::weather::Units,
    services::cache::DEFAULT_TTL_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Origin of the library backend, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Transport timeout; the HTTP stack default applies when unset
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Long-lived session file written by older releases; purged on startup
    pub legacy_store_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub units: Units,
    pub lang: String,
    pub days: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // BIBLIO__API__BASE_URL, BIBLIO__CACHE__TTL_SECONDS, ...
            .add_source(
                Environment::with_prefix("BIBLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("BIBLIO_API_URL").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl CacheConfig {
    /// `ttl_seconds` as a duration; rejects values chrono cannot represent
    pub fn ttl(&self) -> AppResult<TimeDelta> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| {
                AppError::Config(format!("cache.ttl_seconds out of range: {}", self.ttl_seconds))
            })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            legacy_store_path: Some(".biblio/session.json".to_string()),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            lang: "es".to_string(),
            days: 7,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
