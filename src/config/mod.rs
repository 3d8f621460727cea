//! Project configuration management for `crank.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                                |
//! |------------|--------------------------------------------------------|
//! | `[build]`  | Artifact paths, clean targets, compiler mode           |
//! | `[serve]`  | Development server (port, interface, fallback, polling)|
//! | `[deploy]` | Remote host, paths, ownership, environment gating      |

mod section;
mod types;

pub use section::{BuildConfig, DeployConfig, ServeConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing crank.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    pub build: BuildConfig,

    /// Development server settings
    pub serve: ServeConfig,

    /// Deployment settings
    pub deploy: DeployConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            build: BuildConfig::default(),
            serve: ServeConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root
    /// is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(
                "config file '{}' not found in this directory or any parent",
                cli.config.display()
            );
        };

        let mut config = Self::from_path(&config_path)?;
        config.config_path = config_path;
        config.finalize(cli);
        config.validate(cli)?;

        Ok(config)
    }

    /// Parse configuration from TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Finalize configuration after loading: root, paths, CLI overrides.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.root = normalize_path(&root);
        self.config_path = normalize_path(&self.config_path);
        self.normalize_paths();
        self.apply_command_options(cli);
    }

    /// Normalize all paths relative to the project root.
    fn normalize_paths(&mut self) {
        let root = self.root.clone();

        self.build.output = normalize_path(&root.join(&self.build.output));
        self.build.styles_entry = normalize_path(&root.join(&self.build.styles_entry));
        self.build.styles_out = normalize_path(&root.join(&self.build.styles_out));
        self.build.bundle_config = normalize_path(&root.join(&self.build.bundle_config));
        self.build.bundle_out = normalize_path(&root.join(&self.build.bundle_out));
        self.build.clean_paths = self
            .build
            .clean_paths
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();

        if let Some(identity) = self.deploy.identity_file.take() {
            let expanded =
                shellexpand::tilde(identity.to_str().unwrap_or_default()).into_owned();
            let path = PathBuf::from(expanded);
            let path = if path.is_relative() { root.join(path) } else { path };
            self.deploy.identity_file = Some(normalize_path(&path));
        }
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        match &cli.command {
            Commands::Build { build_args } => {
                self.build.clean = build_args.clean;
                if let Some(env) = &build_args.env {
                    self.build.env = env.clone();
                }
            }
            Commands::Serve {
                interface,
                port,
                env,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                // Dev loop compiles for development unless explicitly overridden
                self.build.env = env.clone().unwrap_or_else(|| "development".to_string());
            }
            Commands::Deploy { args } => {
                if let Some(env) = &args.env {
                    self.deploy.env = env.clone();
                }
                if let Some(host) = &args.host {
                    self.deploy.host = host.clone();
                }
                self.build.clean = args.clean;
                // Deployed artifacts are built for the target environment
                self.build.env = self.deploy.env.clone();
            }
            Commands::Init | Commands::Clean => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root (for display).
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Validate configuration for the current command.
    fn validate(&self, cli: &Cli) -> Result<()> {
        if self.serve.poll_interval_ms == 0 {
            bail!(ConfigError::Validation(
                "serve.poll_interval_ms must be greater than 0".into()
            ));
        }
        if self.serve.fallback.is_empty() {
            bail!(ConfigError::Validation("serve.fallback must not be empty".into()));
        }

        if matches!(cli.command, Commands::Deploy { .. }) {
            if self.deploy.host.is_empty() {
                bail!(ConfigError::Validation(
                    "deploy.host is required for the deploy command".into()
                ));
            }
            let remote_root = self.deploy.resolved_remote_root();
            if !remote_root.starts_with('/') || remote_root.chars().any(char::is_whitespace) {
                bail!(ConfigError::Validation(format!(
                    "deploy.remote_root must be an absolute path without whitespace, got `{remote_root}`"
                )));
            }
            if let Some(identity) = &self.deploy.identity_file {
                if !identity.is_file() {
                    bail!(ConfigError::Validation(format!(
                        "deploy.identity_file not found: {}",
                        identity.display()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Search for the config file upward from the current directory.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().context("failed to get cwd").ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        // Invalid TOML syntax - unclosed bracket
        let result: Result<ProjectConfig, _> = toml::from_str("[build\noutput = \"dist\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_project_config_default() {
        let config = ProjectConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.serve.port, 8000);
        assert_eq!(config.build.env, "development");
        assert_eq!(config.deploy.env, "production");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\noutput = \"dist\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[serve]\nport = 9000";
        let (_, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_root_relative() {
        let mut config = ProjectConfig::default();
        config.root = PathBuf::from("/proj");
        assert_eq!(
            config.root_relative(Path::new("/proj/build/bundle.js")),
            PathBuf::from("build/bundle.js")
        );
        assert_eq!(
            config.root_relative(Path::new("/elsewhere/x")),
            PathBuf::from("/elsewhere/x")
        );
    }
}
