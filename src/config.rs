use crate::api::ApiSettings;
use crate::deadline::RequestTimeouts;
use crate::pipeline::config::PipelineConfig;
use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Where the ranked store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankedStoreKind {
    /// `memory://` - in-process sorted set
    InMemory,
}

impl RankedStoreKind {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        if url.starts_with("memory://") {
            Ok(Self::InMemory)
        } else {
            Err(ConfigError::InvalidValue(format!(
                "RANKED_STORE_URL '{}' is not supported (expected memory://)",
                url
            )))
        }
    }
}

/// Process configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub ranked_store: RankedStoreKind,
    pub frontend_url: String,
    pub port: u16,
    pub bootstrap_page_size: usize,
    pub simulation_updates: usize,
    pub pipeline: PipelineConfig,
}

/// Required variable, rejecting empty values
pub fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

/// Optional variable with a default; present-but-unparsable is an error
pub fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{} must be a number, got '{}'", key, v))),
    }
}

/// Optional positive count with a default
pub fn positive_or<F>(lookup: &F, key: &str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(format!("{} must be greater than zero", key)));
    }
    Ok(value)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Required:
    /// - `DATABASE_URL` - durable store (`sqlite://path`)
    /// - `RANKED_STORE_URL` - ranked store (`memory://`)
    /// - `FRONTEND_URL` - allowed CORS origin
    ///
    /// Optional:
    /// - `PORT` (default: 8080)
    /// - `BOOTSTRAP_PAGE_SIZE` (default: 1000)
    /// - `SIMULATION_UPDATES` (default: 500)
    /// - pipeline settings, see `PipelineConfig`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let ranked_store = RankedStoreKind::parse(&required(&lookup, "RANKED_STORE_URL")?)?;
        let frontend_url = required(&lookup, "FRONTEND_URL")?;

        Ok(Self {
            database_url,
            ranked_store,
            frontend_url,
            port: parse_or(&lookup, "PORT", 8080)?,
            bootstrap_page_size: positive_or(&lookup, "BOOTSTRAP_PAGE_SIZE", 1000)?,
            simulation_updates: positive_or(&lookup, "SIMULATION_UPDATES", 500)?,
            pipeline: PipelineConfig::from_lookup(&lookup)?,
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            bootstrap_page_size: self.bootstrap_page_size,
            simulation_updates: self.simulation_updates,
            timeouts: RequestTimeouts::default(),
        }
    }
}
