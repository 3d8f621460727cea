//! Core types and process-wide state.

mod state;
mod version;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
pub use version::DeploymentVersion;
