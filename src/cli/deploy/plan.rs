//! Deploy plan and error taxonomy.

use crate::{config::ProjectConfig, core::DeploymentVersion, log};
use owo_colors::OwoColorize;
use thiserror::Error;

/// The resolved set of decisions for one deploy invocation.
///
/// Constructed once from CLI flags and config, immutable for the run.
#[derive(Debug, Clone, Copy)]
pub struct DeployPlan {
    /// Build artifacts before pushing.
    pub build: bool,
    /// Clean artifacts and caches before the build.
    pub clean: bool,
    /// Push the build output to the remote build directory.
    pub push: bool,
    /// Fix ownership of the staged build.
    pub chown: bool,
    /// Fix permissions of the staged build.
    pub chmod: bool,
    /// Repoint the `current` symlink (the publish moment).
    pub link: bool,
    /// Mirror local state exactly (transfer deletes remote-only files) and
    /// allow re-staging an existing version id.
    pub overwrite: bool,
    /// Report everything, mutate nothing remote.
    pub dry_run: bool,
    /// Skip the interactive confirmation.
    pub assume_yes: bool,
}

impl DeployPlan {
    /// Assemble the plan from deploy CLI arguments.
    pub fn from_args(args: &crate::cli::DeployArgs) -> Self {
        Self {
            build: !args.no_build,
            clean: args.clean,
            push: !args.no_push,
            chown: !args.no_chown,
            chmod: !args.no_chmod,
            link: !args.no_link,
            overwrite: args.overwrite,
            dry_run: args.dry_run,
            assume_yes: args.yes,
        }
    }
}

/// Why a deployment did not complete.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("refusing to deploy to disallowed environment `{0}`")]
    DisallowedEnv(String),

    #[error("deploy aborted: not confirmed")]
    Unconfirmed,

    #[error("version `{0}` is already staged remotely; pass --overwrite to replace it")]
    VersionExists(String),

    #[error("build failed: {0:#}")]
    Build(anyhow::Error),

    #[error("remote {op} failed: {detail}")]
    Remote { op: &'static str, detail: String },
}

/// Print the full plan before any action, so the operator can review every
/// side effect that is about to happen.
pub fn report(plan: &DeployPlan, version: &DeploymentVersion, config: &ProjectConfig) {
    log!("deploy"; "host:       {}", config.deploy.host);
    log!("deploy"; "env:        {}", config.deploy.env);
    log!("deploy"; "version:    {}", version.id);
    log!("deploy"; "build dir:  {}", version.build_dir());
    log!("deploy"; "link path:  {}", version.link_path());
    log!(
        "deploy";
        "steps:      build={} clean={} push={} chown={} chmod={} link={}",
        plan.build, plan.clean, plan.push, plan.chown, plan.chmod, plan.link
    );
    if plan.overwrite {
        log!(
            "deploy";
            "{}",
            "OVERWRITE: remote files absent locally will be DELETED".bright_red().bold()
        );
    }
    if plan.dry_run {
        log!("deploy"; "dry run: no remote state will be modified");
    }
}
