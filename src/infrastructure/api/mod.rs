//! Cloudflare v4 API transport
//!
//! The [`Client`] owns credentials, default headers, a shared
//! [`TokenBucketRateLimiter`] and a [`RetryPolicy`]. Every call goes through a
//! single retry loop that observes the caller's cancellation token at each
//! suspension point, then through [`decode_response`] which maps the final
//! status into raw bytes or an [`ApiError`].

pub mod client;
pub mod credentials;
pub mod decoder;
pub mod errors;
mod executor;
pub mod payload;
pub mod rate_limiter;
pub mod retry;
pub mod route;

pub use client::{default_user_agent, Client, ClientBuilder};
pub use credentials::{redact, AuthMethod, Credentials};
pub use decoder::{decode_json, decode_response, RAY_ID_HEADER};
pub use errors::{AbortStage, ApiError, ApiRequestError};
pub use payload::Payload;
pub use rate_limiter::{RateLimitError, TokenBucketRateLimiter};
pub use retry::RetryPolicy;
pub use route::{is_write_method, RouteType};
