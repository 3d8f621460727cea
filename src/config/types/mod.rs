//! Utility types for configuration handling.

mod error;
mod handle;

pub use error::ConfigError;
pub use handle::{cfg, init_config};
