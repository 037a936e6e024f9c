//! Infrastructure layer module
//!
//! This module contains the external integrations:
//! - Cloudflare v4 API client (transport, retry, rate limiting, decoding)
//! - Configuration management
//! - Logging infrastructure

pub mod api;
pub mod config;
pub mod logging;
