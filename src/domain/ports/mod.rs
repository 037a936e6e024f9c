//! Port trait definitions (Hexagonal Architecture)
//!
//! - RequestLogger: diagnostic sink for the request pipeline

pub mod logger;

pub use logger::{NoopLogger, RecordingLogger, RequestLogger};
