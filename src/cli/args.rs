//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// crank - build, watch-serve and deploy a front-end bundle
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: crank.toml, searched upward from cwd)
    #[arg(short = 'C', long, default_value = "crank.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Install front-end dependencies (npm install)
    Init,

    /// Compile styles and bundle
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Remove build artifacts and compiler caches
    Clean,

    /// Start the development watch server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Compiler mode for the watchers (default: development)
        #[arg(short, long)]
        env: Option<String>,
    },

    /// Push a versioned build to the remote host and publish it
    #[command(visible_alias = "d")]
    Deploy {
        #[command(flatten)]
        args: DeployArgs,
    },
}

/// Shared build arguments for the Build command.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean artifacts and caches before building
    #[arg(short, long)]
    pub clean: bool,

    /// Compiler mode: development or production
    #[arg(short, long)]
    pub env: Option<String>,
}

/// Deploy command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct DeployArgs {
    /// Version id for this deployment (default: derived from the git HEAD)
    #[arg(long)]
    pub version: Option<String>,

    /// Target environment (default: deploy.env from crank.toml)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Remote host (default: deploy.host from crank.toml)
    #[arg(long)]
    pub host: Option<String>,

    /// Mirror local state exactly, deleting remote files absent locally,
    /// and allow re-staging an existing version id
    #[arg(long)]
    pub overwrite: bool,

    /// Report all planned operations without mutating the remote host
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the interactive confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Clean artifacts before the pre-deploy build
    #[arg(long)]
    pub clean: bool,

    /// Skip the pre-deploy build
    #[arg(long)]
    pub no_build: bool,

    /// Skip pushing the build output to the remote host
    #[arg(long)]
    pub no_push: bool,

    /// Skip fixing ownership of the staged build
    #[arg(long)]
    pub no_chown: bool,

    /// Skip fixing permissions of the staged build
    #[arg(long)]
    pub no_chmod: bool,

    /// Stage only; do not repoint the `current` symlink
    #[arg(long)]
    pub no_link: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
    pub const fn is_deploy(&self) -> bool {
        matches!(self.command, Commands::Deploy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_deploy_flags() {
        let cli = Cli::try_parse_from([
            "crank", "deploy", "--version", "v1", "--overwrite", "--dry-run", "--yes",
        ])
        .unwrap();

        let Commands::Deploy { args } = &cli.command else {
            panic!("expected deploy command");
        };
        assert_eq!(args.version.as_deref(), Some("v1"));
        assert!(args.overwrite);
        assert!(args.dry_run);
        assert!(args.yes);
        assert!(!args.no_link);
    }

    #[test]
    fn test_cli_parses_serve_options() {
        let cli = Cli::try_parse_from(["crank", "serve", "-p", "9000"]).unwrap();
        let Commands::Serve { port, .. } = &cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(*port, Some(9000));
    }

    #[test]
    fn test_cli_build_alias() {
        let cli = Cli::try_parse_from(["crank", "b", "--clean"]).unwrap();
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build command");
        };
        assert!(build_args.clean);
    }
}
