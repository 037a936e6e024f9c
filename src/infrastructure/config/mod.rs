//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Well-known Cloudflare credential variables
//! - `CFAPI_` environment overrides
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
