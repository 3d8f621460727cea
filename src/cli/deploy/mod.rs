//! Versioned deployment with atomic symlink publish.
//!
//! A deployment stages the build output into an isolated remote directory
//! (`{remote_root}/builds/{id}`), fixes ownership and permissions, and goes
//! live only when the stable `current` symlink is atomically repointed at
//! the new directory. A failure at any earlier step leaves the previously
//! published version untouched, and the partially staged directory behind
//! for inspection. No step is retried automatically.

mod plan;

pub use plan::{DeployError, DeployPlan, report};

use crate::{
    cli::DeployArgs,
    config::ProjectConfig,
    core::DeploymentVersion,
    log,
    remote::{ExecOutput, RemoteExecutor, SshExecutor, SyncOptions},
};
use anyhow::Result;

/// Entry point for `crank deploy`.
pub fn deploy_site(args: &DeployArgs, config: &ProjectConfig) -> Result<()> {
    let plan = DeployPlan::from_args(args);
    let version = DeploymentVersion::resolve(
        args.version.as_deref(),
        config.get_root(),
        config.deploy.resolved_remote_root(),
    )?;
    let executor = SshExecutor::new(&config.deploy)?;

    run_deploy(&plan, &version, config, &executor, prompt_confirm)?;
    Ok(())
}

/// Execute one deployment according to `plan`.
///
/// Order is fixed: precondition, report, confirmation, build, push, chown,
/// chmod, link. Push must succeed before ownership/permission/link steps
/// touch the same directory, and the link repoint is always last.
pub fn run_deploy(
    plan: &DeployPlan,
    version: &DeploymentVersion,
    config: &ProjectConfig,
    executor: &dyn RemoteExecutor,
    confirm: impl FnOnce() -> bool,
) -> Result<(), DeployError> {
    // A development environment must never receive a deployment
    let env = &config.deploy.env;
    if config.deploy.disallowed_envs.iter().any(|e| e == env) {
        return Err(DeployError::DisallowedEnv(env.clone()));
    }

    report(plan, version, config);

    if !plan.assume_yes && !confirm() {
        return Err(DeployError::Unconfirmed);
    }

    if plan.build {
        crate::cli::build::run_build(config, env, plan.clean).map_err(DeployError::Build)?;
    }

    let build_dir = version.build_dir();

    if plan.push {
        stage(plan, version, config, executor, &build_dir)?;
    }

    if plan.chown && !plan.dry_run {
        let owner = &config.deploy.owner;
        let group = &config.deploy.group;
        log!("deploy"; "chown -R {owner}:{group} {build_dir}");
        run_checked(
            executor,
            "chown",
            &format!("chown -R {owner}:{group} {build_dir}"),
            true,
        )?;
    }

    if plan.chmod && !plan.dry_run {
        // u/g rwX: execute bit only on directories and already-executable
        // files; others get no access
        log!("deploy"; "chmod -R u=rwX,g=rwX,o-rwx {build_dir}");
        run_checked(
            executor,
            "chmod",
            &format!("chmod -R u=rwX,g=rwX,o-rwx {build_dir}"),
            true,
        )?;
    }

    if plan.link && !plan.dry_run {
        let link_path = version.link_path();
        log!("deploy"; "publishing: {link_path} -> {build_dir}");
        // -T treats the link as a file, -f replaces it atomically
        run_checked(
            executor,
            "link repoint",
            &format!("ln -sfT {build_dir} {link_path}"),
            true,
        )?;
        log!("deploy"; "version {} is live", version.id);
    } else if plan.dry_run {
        log!("deploy"; "dry run complete, remote state unchanged");
    } else {
        log!("deploy"; "version {} staged (not published)", version.id);
    }

    Ok(())
}

/// Stage the build output into the remote build directory.
fn stage(
    plan: &DeployPlan,
    version: &DeploymentVersion,
    config: &ProjectConfig,
    executor: &dyn RemoteExecutor,
    build_dir: &str,
) -> Result<(), DeployError> {
    // Overwrite safety: a version id is never silently reused. The probe
    // is a remote read, so it also runs on dry runs.
    if !plan.overwrite {
        let probe = run_remote(executor, "build dir probe", &format!("test -d {build_dir}"), false)?;
        if probe.success() {
            return Err(DeployError::VersionExists(version.id.clone()));
        }
    }

    if !plan.dry_run {
        run_checked(executor, "mkdir", &format!("mkdir -p {build_dir}"), false)?;
    }

    log!(
        "deploy";
        "syncing {} -> {}:{build_dir}{}",
        config.root_relative(&config.build.output).display(),
        config.deploy.host,
        if plan.dry_run { " (dry run)" } else { "" }
    );
    executor
        .sync(
            &config.build.output,
            build_dir,
            &SyncOptions {
                delete: plan.overwrite,
                dry_run: plan.dry_run,
                echo: true,
            },
        )
        .map_err(|e| DeployError::Remote {
            op: "transfer",
            detail: format!("{e:#}"),
        })?;

    Ok(())
}

/// Run a remote command, mapping execution failure to a deploy error.
fn run_remote(
    executor: &dyn RemoteExecutor,
    op: &'static str,
    command: &str,
    sudo: bool,
) -> Result<ExecOutput, DeployError> {
    executor.run(command, sudo).map_err(|e| DeployError::Remote {
        op,
        detail: format!("{e:#}"),
    })
}

/// Run a remote command and require a zero exit status.
fn run_checked(
    executor: &dyn RemoteExecutor,
    op: &'static str,
    command: &str,
    sudo: bool,
) -> Result<(), DeployError> {
    let output = run_remote(executor, op, command, sudo)?;
    if !output.success() {
        return Err(DeployError::Remote {
            op,
            detail: if output.stderr.trim().is_empty() {
                format!("exit code {}", output.exit_code)
            } else {
                output.stderr.trim().to_string()
            },
        });
    }
    Ok(())
}

/// Prompt the operator to continue. Returns true only on explicit yes.
fn prompt_confirm() -> bool {
    use std::io::{self, Write};

    eprint!("Proceed with deploy? [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ExecOutput, RemoteExecutor, SyncOptions};
    use std::cell::RefCell;
    use std::path::Path;

    /// One observed remote interaction.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Run { command: String, sudo: bool },
        Sync { remote: String, delete: bool, dry_run: bool },
    }

    /// Records every remote interaction instead of performing it.
    struct RecordingExecutor {
        calls: RefCell<Vec<Call>>,
        /// Exit code returned for `test -d` probes (1 = does not exist).
        probe_exit: i32,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                probe_exit: 1,
            }
        }

        fn with_existing_build_dir() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                probe_exit: 0,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl RemoteExecutor for RecordingExecutor {
        fn run(&self, command: &str, sudo: bool) -> anyhow::Result<ExecOutput> {
            self.calls.borrow_mut().push(Call::Run {
                command: command.to_string(),
                sudo,
            });
            let exit_code = if command.starts_with("test -d") {
                self.probe_exit
            } else {
                0
            };
            Ok(ExecOutput {
                exit_code,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        fn sync(&self, _local: &Path, remote: &str, opts: &SyncOptions) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::Sync {
                remote: remote.to_string(),
                delete: opts.delete,
                dry_run: opts.dry_run,
            });
            Ok(())
        }
    }

    fn test_config() -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.deploy.host = "h".into();
        config.deploy.owner = "bycycle".into();
        config.deploy.group = "bycycle".into();
        config
    }

    fn test_version() -> DeploymentVersion {
        DeploymentVersion {
            id: "v1".into(),
            remote_root: "/sites/h/webui".into(),
        }
    }

    /// Full plan, no build (the builder shells out to real tools).
    fn full_plan() -> DeployPlan {
        DeployPlan {
            build: false,
            clean: false,
            push: true,
            chown: true,
            chmod: true,
            link: true,
            overwrite: false,
            dry_run: false,
            assume_yes: true,
        }
    }

    #[test]
    fn test_full_deploy_sequence_and_link_last() {
        let executor = RecordingExecutor::new();
        run_deploy(&full_plan(), &test_version(), &test_config(), &executor, || true).unwrap();

        let calls = executor.calls();
        assert_eq!(
            calls,
            vec![
                Call::Run {
                    command: "test -d /sites/h/webui/builds/v1".into(),
                    sudo: false
                },
                Call::Run {
                    command: "mkdir -p /sites/h/webui/builds/v1".into(),
                    sudo: false
                },
                Call::Sync {
                    remote: "/sites/h/webui/builds/v1".into(),
                    delete: false,
                    dry_run: false
                },
                Call::Run {
                    command: "chown -R bycycle:bycycle /sites/h/webui/builds/v1".into(),
                    sudo: true
                },
                Call::Run {
                    command: "chmod -R u=rwX,g=rwX,o-rwx /sites/h/webui/builds/v1".into(),
                    sudo: true
                },
                Call::Run {
                    command: "ln -sfT /sites/h/webui/builds/v1 /sites/h/webui/current".into(),
                    sudo: true
                },
            ]
        );
    }

    #[test]
    fn test_dry_run_performs_no_mutations() {
        let executor = RecordingExecutor::new();
        let plan = DeployPlan {
            dry_run: true,
            ..full_plan()
        };
        run_deploy(&plan, &test_version(), &test_config(), &executor, || true).unwrap();

        for call in executor.calls() {
            match call {
                // The existence probe is the only permitted remote command
                Call::Run { command, .. } => assert!(command.starts_with("test -d")),
                Call::Sync { dry_run, .. } => assert!(dry_run),
            }
        }
    }

    #[test]
    fn test_disallowed_env_stops_before_any_remote_call() {
        let executor = RecordingExecutor::new();
        let mut config = test_config();
        config.deploy.env = "development".into();

        let result = run_deploy(&full_plan(), &test_version(), &config, &executor, || true);

        assert!(matches!(result, Err(DeployError::DisallowedEnv(e)) if e == "development"));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_unconfirmed_deploy_aborts_cleanly() {
        let executor = RecordingExecutor::new();
        let plan = DeployPlan {
            assume_yes: false,
            ..full_plan()
        };

        let result = run_deploy(&plan, &test_version(), &test_config(), &executor, || false);

        assert!(matches!(result, Err(DeployError::Unconfirmed)));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_overwrite_maps_to_delete_and_skips_probe() {
        let executor = RecordingExecutor::new();
        let plan = DeployPlan {
            overwrite: true,
            ..full_plan()
        };
        run_deploy(&plan, &test_version(), &test_config(), &executor, || true).unwrap();

        let calls = executor.calls();
        assert!(
            !calls
                .iter()
                .any(|c| matches!(c, Call::Run { command, .. } if command.starts_with("test -d")))
        );
        assert!(calls.iter().any(|c| matches!(
            c,
            Call::Sync { delete: true, dry_run: false, .. }
        )));
    }

    #[test]
    fn test_existing_version_refused_without_overwrite() {
        let executor = RecordingExecutor::with_existing_build_dir();
        let result = run_deploy(&full_plan(), &test_version(), &test_config(), &executor, || true);

        assert!(matches!(result, Err(DeployError::VersionExists(id)) if id == "v1"));
        // Nothing mutating happened after the refused probe
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn test_no_push_skips_staging_but_not_publish_steps() {
        let executor = RecordingExecutor::new();
        let plan = DeployPlan {
            push: false,
            ..full_plan()
        };
        run_deploy(&plan, &test_version(), &test_config(), &executor, || true).unwrap();

        let calls = executor.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::Sync { .. })));
        assert!(calls.iter().any(
            |c| matches!(c, Call::Run { command, .. } if command.starts_with("ln -sfT"))
        ));
    }

    #[test]
    fn test_stage_only_plan_never_links() {
        let executor = RecordingExecutor::new();
        let plan = DeployPlan {
            link: false,
            ..full_plan()
        };
        run_deploy(&plan, &test_version(), &test_config(), &executor, || true).unwrap();

        assert!(!executor.calls().iter().any(
            |c| matches!(c, Call::Run { command, .. } if command.starts_with("ln "))
        ));
    }

    #[test]
    fn test_remote_failure_stops_remaining_steps() {
        /// Fails every chown.
        struct FailingChown(RecordingExecutor);
        impl RemoteExecutor for FailingChown {
            fn run(&self, command: &str, sudo: bool) -> anyhow::Result<ExecOutput> {
                let mut out = self.0.run(command, sudo)?;
                if command.starts_with("chown") {
                    out.exit_code = 1;
                    out.stderr = "chown: operation not permitted".into();
                }
                Ok(out)
            }
            fn sync(&self, local: &Path, remote: &str, opts: &SyncOptions) -> anyhow::Result<()> {
                self.0.sync(local, remote, opts)
            }
        }

        let executor = FailingChown(RecordingExecutor::new());
        let result = run_deploy(&full_plan(), &test_version(), &test_config(), &executor, || true);

        assert!(matches!(result, Err(DeployError::Remote { op: "chown", .. })));
        // chmod and link were never attempted
        let calls = executor.0.calls();
        assert!(!calls.iter().any(
            |c| matches!(c, Call::Run { command, .. } if command.starts_with("chmod"))
        ));
        assert!(!calls.iter().any(
            |c| matches!(c, Call::Run { command, .. } if command.starts_with("ln "))
        ));
    }
}
