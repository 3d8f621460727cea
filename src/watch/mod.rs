//! Supervision of long-running background compilers.
//!
//! The dev loop launches each watch-mode compiler as a supervised child.
//! Handles kill their child on drop, so watchers never outlive the dev
//! session. Artifact readiness is observed by polling the filesystem;
//! a dead producer or an elapsed timeout surfaces as a distinct error
//! instead of blocking forever.

use crate::{log, utils::exec::Cmd};
use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    process::Child,
    time::{Duration, Instant},
};
use thiserror::Error;

/// Failures while waiting for a watcher artifact.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watcher `{name}` exited with status {code:?} before producing its artifact")]
    ProducerExited { name: String, code: Option<i32> },

    #[error("timed out after {waited:?} waiting for {}", path.display())]
    TimedOut { path: PathBuf, waited: Duration },

    #[error("interrupted while waiting for {}", path.display())]
    Interrupted { path: PathBuf },
}

/// Liveness of a supervised watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherStatus {
    Running,
    Exited(Option<i32>),
}

/// A supervised background compiler process.
///
/// Killing on drop guarantees no orphaned watchers when the dev loop exits,
/// whether normally or through an error path.
pub struct WatcherHandle {
    name: String,
    child: Child,
}

/// Start a long-running background process under supervision.
pub fn launch(name: &str, cmd: Cmd) -> Result<WatcherHandle> {
    let child = cmd.spawn()?;
    log!("watch"; "started {} (pid {})", name, child.id());
    Ok(WatcherHandle {
        name: name.to_string(),
        child,
    })
}

impl WatcherHandle {
    /// Watcher name, for reporting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking liveness check.
    pub fn status(&mut self) -> WatcherStatus {
        match self.child.try_wait() {
            Ok(Some(status)) => WatcherStatus::Exited(status.code()),
            Ok(None) => WatcherStatus::Running,
            // try_wait failing means we lost track of the child; report it
            // as exited so callers fail fast rather than poll forever
            Err(_) => WatcherStatus::Exited(None),
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        if matches!(self.status(), WatcherStatus::Running) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Block until `path` exists on disk.
///
/// Polls at `interval`. Fails fast when the producer exits before the
/// artifact appears, when `timeout` elapses (`None` = wait forever), or
/// when shutdown is requested. Emits a one-time "waiting" notice if the
/// artifact is not immediately present.
pub fn await_artifact(
    path: &Path,
    producer: &mut WatcherHandle,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<(), WatchError> {
    let start = Instant::now();
    let mut announced = false;

    loop {
        if path.exists() {
            return Ok(());
        }

        if crate::core::is_shutdown() {
            return Err(WatchError::Interrupted {
                path: path.to_path_buf(),
            });
        }

        if let WatcherStatus::Exited(code) = producer.status() {
            return Err(WatchError::ProducerExited {
                name: producer.name().to_string(),
                code,
            });
        }

        if let Some(limit) = timeout {
            let waited = start.elapsed();
            if waited >= limit {
                return Err(WatchError::TimedOut {
                    path: path.to_path_buf(),
                    waited,
                });
            }
        }

        if !announced {
            log!("watch"; "waiting for {} ...", path.display());
            announced = true;
        }

        std::thread::sleep(interval);
    }
}
