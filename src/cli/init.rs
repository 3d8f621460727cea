//! `crank init` - install front-end dependencies.

use crate::{config::ProjectConfig, exec, log, utils::exec::ensure_tool};
use anyhow::Result;

/// Run `npm install` in the project root.
pub fn install(config: &ProjectConfig) -> Result<()> {
    ensure_tool("npm")?;
    log!("init"; "installing dependencies");
    exec!(pty = true; config.get_root(); "npm"; "install")?;
    log!("init"; "done");
    Ok(())
}
