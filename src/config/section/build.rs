//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "build"                     # Bundle output directory
//! styles_entry = "src/styles/index.scss"
//! styles_out = "build/styles/index.css"
//! bundle_config = "rollup.config.js"
//! bundle_out = "build/bundle.js"
//! clean_paths = ["build", ".cache"]    # Removed by `crank clean`
//! env = "development"                  # Default compiler mode
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory (served by `crank serve`, pushed by `crank deploy`).
    pub output: PathBuf,

    /// Sass entry point.
    pub styles_entry: PathBuf,

    /// Compiled stylesheet path. The dev loop waits for this artifact.
    pub styles_out: PathBuf,

    /// Rollup config file.
    pub bundle_config: PathBuf,

    /// Compiled bundle path. The dev loop waits for this artifact.
    pub bundle_out: PathBuf,

    /// Paths removed by `crank clean` (build artifacts and compiler caches).
    pub clean_paths: Vec<PathBuf>,

    /// Compiler mode: "development" or "production".
    /// Selects minification, source maps and live-reload instrumentation.
    pub env: String,

    /// Clean before building (set via --clean).
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("build"),
            styles_entry: PathBuf::from("src/styles/index.scss"),
            styles_out: PathBuf::from("build/styles/index.css"),
            bundle_config: PathBuf::from("rollup.config.js"),
            bundle_out: PathBuf::from("build/bundle.js"),
            clean_paths: vec![PathBuf::from("build"), PathBuf::from(".cache")],
            env: "development".to_string(),
            clean: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.build.output, PathBuf::from("build"));
        assert_eq!(config.build.bundle_out, PathBuf::from("build/bundle.js"));
        assert_eq!(config.build.env, "development");
        assert_eq!(config.build.clean_paths.len(), 2);
        assert!(!config.build.clean);
    }

    #[test]
    fn test_build_config_override() {
        let config = test_parse_config(
            "[build]\noutput = \"dist\"\nenv = \"production\"\nclean_paths = [\"dist\"]",
        );

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.env, "production");
        assert_eq!(config.build.clean_paths, vec![PathBuf::from("dist")]);
    }
}
