//! Domain layer
//!
//! Wire and resource models plus the ports the infrastructure implements.

pub mod models;
pub mod ports;
