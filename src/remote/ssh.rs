//! SSH/rsync implementation of the remote executor.

use super::{ExecOutput, RemoteExecutor, SyncOptions};
use crate::{
    config::DeployConfig,
    log,
    utils::exec::{Cmd, ensure_tool},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Remote executor backed by the system `ssh` and `rsync` binaries.
pub struct SshExecutor {
    target: String,
    identity_file: Option<PathBuf>,
}

impl SshExecutor {
    /// Build an executor for the configured deploy target.
    ///
    /// Verifies `ssh` and `rsync` are available up front so a missing tool
    /// fails before any remote interaction.
    pub fn new(deploy: &DeployConfig) -> Result<Self> {
        ensure_tool("ssh")?;
        ensure_tool("rsync")?;
        Ok(Self {
            target: deploy.ssh_target(),
            identity_file: deploy.identity_file.clone(),
        })
    }

    /// `ssh` invocation prefix shared by `run` and rsync's transport.
    fn ssh_command(&self) -> String {
        match &self.identity_file {
            Some(identity) => format!("ssh -i {}", identity.display()),
            None => "ssh".to_string(),
        }
    }
}

impl RemoteExecutor for SshExecutor {
    fn run(&self, command: &str, sudo: bool) -> Result<ExecOutput> {
        let remote_command = if sudo {
            format!("sudo sh -c {}", sh_quote(command))
        } else {
            command.to_string()
        };

        let mut cmd = Cmd::new("ssh");
        if let Some(identity) = &self.identity_file {
            cmd = cmd.arg("-i").arg(identity);
        }
        let output = cmd
            .arg(&self.target)
            .arg(&remote_command)
            .output_unchecked()
            .with_context(|| format!("failed to run `{command}` on {}", self.target))?;

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn sync(&self, local: &Path, remote: &str, opts: &SyncOptions) -> Result<()> {
        // Trailing slash: sync the directory's contents, not the directory
        let source = format!("{}/", local.display());
        let destination = format!("{}:{}/", self.target, remote);

        let mut cmd = Cmd::new("rsync").args(["-rltz", "-e", &self.ssh_command()]);
        if opts.echo {
            cmd = cmd.arg("-v");
        }
        if opts.delete {
            cmd = cmd.arg("--delete");
        }
        if opts.dry_run {
            cmd = cmd.arg("--dry-run");
        }

        let output = cmd
            .arg(&source)
            .arg(&destination)
            .run()
            .with_context(|| format!("rsync to {destination} failed"))?;

        if opts.echo {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stdout = stdout.trim();
            if !stdout.is_empty() {
                log!("deploy"; "{}", stdout);
            }
        }
        Ok(())
    }
}

/// Quote a string for `sh -c`. Single quotes with the usual `'\''` escape.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;

    #[test]
    fn test_sh_quote() {
        assert_eq!(sh_quote("chown -R a:b /x"), "'chown -R a:b /x'");
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_ssh_command_with_identity() {
        let executor = SshExecutor {
            target: "deploy@bycycle.org".into(),
            identity_file: Some(PathBuf::from("/home/u/.ssh/id_deploy")),
        };
        assert_eq!(executor.ssh_command(), "ssh -i /home/u/.ssh/id_deploy");
    }

    #[test]
    fn test_target_from_config() {
        let mut deploy = DeployConfig::default();
        deploy.host = "bycycle.org".into();
        deploy.user = "deploy".into();
        assert_eq!(deploy.ssh_target(), "deploy@bycycle.org");
    }
}
