//! Configuration section definitions.

mod build;
mod deploy;
mod serve;

pub use build::BuildConfig;
pub use deploy::DeployConfig;
pub use serve::ServeConfig;
