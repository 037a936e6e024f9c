//! Cloudflare API - typed client for the Cloudflare v4 REST API
//!
//! Every call made through a [`Client`] shares one token-bucket rate limiter,
//! retries transient failures with exponential backoff, and can be cancelled
//! at any suspension point through a [`CancellationToken`].
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): API envelopes, resource models, configuration
//!   and the request logger port
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, retry loop,
//!   rate limiter, response decoding, config loading and logging setup
//! - **Service Layer** (`services`): typed resource facades
//! - **CLI Layer** (`cli`): the `cfapi` command-line interface
//!
//! # Example
//!
//! ```no_run
//! use cloudflare_api::{Client, ZoneParams};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::builder().api_token("my-token").build()?;
//!     let cancel = CancellationToken::new();
//!
//!     for zone in client.zones().list_all(&cancel, &ZoneParams::default()).await? {
//!         println!("{} {}", zone.id, zone.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ApiResponse, Config, PaginatedResponse, Response, ResponseInfo, ResultInfo, Zone, ZoneId,
    ZoneParams,
};
pub use domain::ports::{NoopLogger, RequestLogger};
pub use infrastructure::api::{
    ApiError, ApiRequestError, Client, ClientBuilder, Payload, RetryPolicy,
    TokenBucketRateLimiter,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::ZonesService;
