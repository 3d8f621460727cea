//! Remote executor boundary.
//!
//! The deployment manager only depends on this trait: run a command on the
//! remote host, or sync a local directory to a remote path. Keeping the
//! boundary narrow makes the deploy algorithm testable against a recording
//! double.

mod ssh;

pub use ssh::SshExecutor;

use anyhow::Result;
use std::path::Path;

/// Result of one remote command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    /// Did the remote command exit 0?
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Options for a directory sync.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Delete remote files absent locally (mirror mode).
    pub delete: bool,
    /// Compute and report the transfer without performing it.
    pub dry_run: bool,
    /// Log per-file transfer output.
    pub echo: bool,
}

/// Executes commands and file transfers on a remote host.
pub trait RemoteExecutor {
    /// Run `command` on the remote host. A non-`Ok` return means the command
    /// could not be executed at all; a failing command is reported through
    /// `ExecOutput::exit_code` so callers can treat specific non-zero exits
    /// (e.g. an existence probe) as answers rather than errors.
    fn run(&self, command: &str, sudo: bool) -> Result<ExecOutput>;

    /// Sync the contents of `local` into the remote directory `remote`.
    fn sync(&self, local: &Path, remote: &str, opts: &SyncOptions) -> Result<()>;
}
