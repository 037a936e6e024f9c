//! Typed resource facades over the API client

pub mod zones;

pub use zones::ZonesService;
