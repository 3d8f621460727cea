//! Command-line interface module.

mod args;
pub mod build;
pub mod deploy;
pub mod init;
pub mod serve;

pub use args::{BuildArgs, Cli, Commands, DeployArgs};
