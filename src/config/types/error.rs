//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating `crank.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
