//! Watch-mode compiler launching for the dev loop.

use crate::{
    cli::build::{bundle_cmd, style_cmd},
    config::ProjectConfig,
    utils::exec::ensure_tool,
    watch::{self, WatcherHandle},
};
use anyhow::Result;

/// Verify the watch-mode compilers exist before spawning anything.
pub fn ensure_tools() -> Result<()> {
    ensure_tool("sass")?;
    ensure_tool("rollup")?;
    Ok(())
}

/// Launch the sass watcher producing the compiled stylesheet.
pub fn launch_style_watcher(config: &ProjectConfig) -> Result<WatcherHandle> {
    watch::launch("sass", style_cmd(config, &config.build.env, true))
}

/// Launch the rollup watcher producing the script bundle.
///
/// Live reload is instrumented in watch mode so the browser refreshes on
/// rebuild.
pub fn launch_bundle_watcher(config: &ProjectConfig) -> Result<WatcherHandle> {
    watch::launch("rollup", bundle_cmd(config, &config.build.env, true, true))
}
