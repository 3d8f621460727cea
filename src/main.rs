//! crank - build, watch-serve and deploy a front-end bundle.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod logger;
mod remote;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ProjectConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(ProjectConfig::load(&cli)?);

    match &cli.command {
        Commands::Init => cli::init::install(&config),
        Commands::Build { .. } => {
            cli::build::run_build(&config, &config.build.env, config.build.clean)
        }
        Commands::Clean => cli::build::clean_artifacts(&config),
        Commands::Serve { .. } => cli::serve::serve(&config),
        Commands::Deploy { args } => cli::deploy::deploy_site(args, &config),
    }
}
