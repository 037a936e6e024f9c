use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure for the API client and CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Endpoint and transport configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication material
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Full base URL, e.g. `https://api.cloudflare.com/client/v4`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent override; the crate default is used when unset
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-attempt HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

/// Credentials as they appear in configuration.
///
/// `api_key` and `api_token` are mutually exclusive; the check happens when
/// the client is built.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CredentialsConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub api_email: Option<String>,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub user_service_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CredentialsConfig")
            .field("api_key", &mask(&self.api_key))
            .field("api_email", &self.api_email)
            .field("api_token", &mask(&self.api_token))
            .field("user_service_key", &mask(&self.user_service_key))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

// 1200 requests per 5 minutes is the provider's default account limit.
const fn default_requests_per_second() -> f64 {
    4.0
}

const fn default_burst_size() -> u32 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, in milliseconds
    #[serde(default = "default_min_retry_delay_ms")]
    pub min_retry_delay_ms: u64,

    /// Upper bound for any backoff, in milliseconds
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_min_retry_delay_ms() -> u64 {
    1_000
}

const fn default_max_retry_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            min_retry_delay_ms: default_min_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
        }
    }
}
