use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::api::client::{
    ENV_API_KEY, ENV_API_TOKEN, ENV_EMAIL, ENV_USER_SERVICE_KEY,
};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cfapi.yaml";

/// Prefix of environment overrides, nested with `__`
pub const ENV_PREFIX: &str = "CFAPI_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid min_retry_delay_ms: {0}. Must be greater than 0")]
    InvalidRetryDelay(u64),

    #[error(
        "Invalid backoff configuration: min_retry_delay_ms ({0}) must not exceed max_retry_delay_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `path`, or `cfapi.yaml` in the working directory when present
    /// 3. Well-known `CLOUDFLARE_*` credential variables
    /// 4. `CFAPI_*` environment variables
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()).into());
            }
        }

        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        let config: Config = Self::figment(&file)
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", file.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The provider chain used by [`ConfigLoader::load`]
    pub fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(well_known_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "api.base_url cannot be empty".to_string(),
            ));
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "api.timeout_secs must be at least 1".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if !(config.rate_limit.requests_per_second.is_finite()
            && config.rate_limit.requests_per_second > 0.0)
        {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }

        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        if config.retry.min_retry_delay_ms == 0 {
            return Err(ConfigError::InvalidRetryDelay(config.retry.min_retry_delay_ms));
        }

        if config.retry.min_retry_delay_ms > config.retry.max_retry_delay_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.min_retry_delay_ms,
                config.retry.max_retry_delay_ms,
            ));
        }

        let creds = &config.credentials;
        if creds.api_key.is_some() && creds.api_token.is_some() {
            return Err(ConfigError::ValidationFailed(
                "credentials.api_key and credentials.api_token are mutually exclusive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Credential variables shared with other Cloudflare tooling
fn well_known_env() -> Env {
    Env::raw()
        .only(&[ENV_API_TOKEN, ENV_API_KEY, ENV_EMAIL, ENV_USER_SERVICE_KEY])
        .map(|key| {
            if key == ENV_API_TOKEN {
                "credentials.api_token".into()
            } else if key == ENV_API_KEY {
                "credentials.api_key".into()
            } else if key == ENV_EMAIL {
                "credentials.api_email".into()
            } else if key == ENV_USER_SERVICE_KEY {
                "credentials.user_service_key".into()
            } else {
                key.into()
            }
        })
}
