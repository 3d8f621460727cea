//! Deployment version identity and remote path layout.
//!
//! A deployment stages into `{remote_root}/builds/{id}` and goes live only
//! when `{remote_root}/current` is repointed at that directory.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::Path;

/// Identifies one deployable build on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentVersion {
    /// Opaque version string (explicit, or derived from the git HEAD).
    pub id: String,
    /// Base remote path for this host+app, e.g. `/sites/bycycle.org/webui`.
    pub remote_root: String,
}

impl DeploymentVersion {
    /// Resolve the version for one deploy run.
    ///
    /// Uses the caller-supplied id if present, otherwise derives one from
    /// the current git HEAD (short hash, `-dirty` suffix when the worktree
    /// has uncommitted changes).
    pub fn resolve(explicit: Option<&str>, root: &Path, remote_root: String) -> Result<Self> {
        let id = match explicit {
            Some(id) => {
                validate_id(id)?;
                id.to_string()
            }
            None => describe_head(root)?,
        };
        Ok(Self { id, remote_root })
    }

    /// Remote directory the build is staged into.
    pub fn build_dir(&self) -> String {
        format!("{}/builds/{}", self.remote_root, self.id)
    }

    /// Stable symlink consumers read; repointed at `build_dir` on publish.
    pub fn link_path(&self) -> String {
        format!("{}/current", self.remote_root)
    }
}

impl fmt::Display for DeploymentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// The id is interpolated into remote shell commands and paths,
/// so restrict it to a safe character set.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("version id must not be empty");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        bail!("version id `{id}` contains characters outside [A-Za-z0-9._-]");
    }
    if id.starts_with('.') || id.starts_with('-') {
        bail!("version id `{id}` must not start with `.` or `-`");
    }
    Ok(())
}

/// Derive a version id from the repository at `root`.
fn describe_head(root: &Path) -> Result<String> {
    let repo = gix::discover(root)
        .with_context(|| format!("no git repository found at {}", root.display()))?;
    let head = repo
        .head_id()
        .context("repository has no commits to derive a version from")?;

    let mut id = head.shorten_or_id().to_string();
    if repo.is_dirty().unwrap_or(false) {
        id.push_str("-dirty");
    }
    Ok(id)
}
