//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads: the HTTP request pool and the main
//! control flow share the loaded config without locking.

use crate::config::ProjectConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<ProjectConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ProjectConfig::default()));

/// Get the current config (cheap, lock-free).
#[inline]
pub fn cfg() -> Arc<ProjectConfig> {
    CONFIG.load_full()
}

/// Install the loaded config as the global one.
#[inline]
pub fn init_config(config: ProjectConfig) -> Arc<ProjectConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
