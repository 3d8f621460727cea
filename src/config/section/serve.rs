//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8000                 # HTTP port number
//! fallback = "index.html"     # Document served for unknown paths (SPA routing)
//! poll_interval_ms = 500      # Artifact readiness poll interval
//! wait_timeout_secs = 120     # Max wait for watcher artifacts (0 = forever)
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Document served for request paths that resolve to no existing file.
    /// Enables client-side routing for single-page applications.
    pub fallback: String,

    /// Poll interval while waiting for watcher artifacts, in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a watcher artifact, in seconds.
    /// `0` disables the timeout (wait forever).
    pub wait_timeout_secs: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
            fallback: "index.html".to_string(),
            poll_interval_ms: 500,
            wait_timeout_secs: 120,
        }
    }
}
