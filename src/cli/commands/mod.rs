//! CLI command implementations.

pub mod call;
pub mod zone;
