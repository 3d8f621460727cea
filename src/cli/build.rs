//! Build orchestration: clean, style compilation, bundle compilation.
//!
//! The compilers themselves (`sass`, `rollup`) are external tools; this
//! module only shapes their invocations and consumes their exit status.
//! Watch-mode variants of the same commands are spawned by the dev loop.

use crate::{
    config::ProjectConfig,
    debug, log,
    utils::exec::{Cmd, ensure_tool},
};
use anyhow::{Context, Result};
use std::fs;

/// Run the full build: optional clean, then styles, then bundle.
///
/// Each step's failure aborts the remaining steps; the failing tool's
/// stderr and exit status are carried in the error.
pub fn run_build(config: &ProjectConfig, env: &str, clean: bool) -> Result<()> {
    ensure_tool("sass")?;
    ensure_tool("rollup")?;

    if clean {
        clean_artifacts(config)?;
    }

    log!("build"; "compiling styles ({env})");
    style_cmd(config, env, false)
        .run()
        .context("style compilation failed")?;

    log!("build"; "compiling bundle ({env})");
    bundle_cmd(config, env, false, false)
        .run()
        .context("bundle compilation failed")?;

    log!("build"; "done -> {}", config.root_relative(&config.build.output).display());
    Ok(())
}

/// Remove build artifacts and compiler caches. Idempotent.
pub fn clean_artifacts(config: &ProjectConfig) -> Result<()> {
    for path in &config.build.clean_paths {
        if path.exists() {
            log!("clean"; "removing {}", config.root_relative(path).display());
            fs::remove_dir_all(path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        } else {
            debug!("clean"; "{} absent, skipping", config.root_relative(path).display());
        }
    }
    Ok(())
}

/// Sass invocation for one-shot or watch-mode style compilation.
pub fn style_cmd(config: &ProjectConfig, env: &str, watch: bool) -> Cmd {
    let mut cmd = Cmd::new("sass").cwd(config.get_root());
    if watch {
        cmd = cmd.arg("--watch");
    }
    if env == "production" {
        cmd = cmd.args(["--style=compressed", "--no-source-map"]);
    }
    cmd.arg(&config.build.styles_entry).arg(&config.build.styles_out)
}

/// Rollup invocation for one-shot or watch-mode bundle compilation.
///
/// `NODE_ENV` selects minification/instrumentation inside the rollup
/// config; `LIVE_RELOAD` toggles the livereload plugin for the dev loop.
pub fn bundle_cmd(config: &ProjectConfig, env: &str, live_reload: bool, watch: bool) -> Cmd {
    let mut cmd = Cmd::new("rollup")
        .cwd(config.get_root())
        .arg("-c")
        .arg(&config.build.bundle_config);
    if watch {
        cmd = cmd.arg("--watch");
    }
    cmd.envs([
        ("NODE_ENV", env),
        ("LIVE_RELOAD", if live_reload { "1" } else { "0" }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(root: &std::path::Path) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.root = root.to_path_buf();
        config.build.clean_paths = vec![root.join("build"), root.join(".cache")];
        config
    }

    #[test]
    fn test_clean_artifacts_removes_existing() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("styles")).unwrap();
        fs::write(build.join("bundle.js"), "x").unwrap();

        let config = test_config(dir.path());
        clean_artifacts(&config).unwrap();

        assert!(!build.exists());
    }

    #[test]
    fn test_clean_artifacts_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        // Nothing exists; both calls succeed
        clean_artifacts(&config).unwrap();
        clean_artifacts(&config).unwrap();
    }

    #[test]
    fn test_style_cmd_production_flags() {
        let mut config = ProjectConfig::default();
        config.build.styles_entry = PathBuf::from("/p/src/styles/index.scss");
        config.build.styles_out = PathBuf::from("/p/build/styles/index.css");

        let prod = style_cmd(&config, "production", false).preview_args();
        assert!(prod.contains(&"--style=compressed".to_string()));
        assert!(prod.contains(&"--no-source-map".to_string()));
        assert!(!prod.contains(&"--watch".to_string()));

        let dev = style_cmd(&config, "development", true).preview_args();
        assert!(dev.contains(&"--watch".to_string()));
        assert!(!dev.contains(&"--style=compressed".to_string()));
    }

    #[test]
    fn test_bundle_cmd_watch_flag() {
        let config = ProjectConfig::default();
        let watch = bundle_cmd(&config, "development", true, true).preview_args();
        assert!(watch.contains(&"--watch".to_string()));

        let oneshot = bundle_cmd(&config, "production", false, false).preview_args();
        assert!(!oneshot.contains(&"--watch".to_string()));
    }
}
