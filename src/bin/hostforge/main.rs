//! Hostforge CLI - provisioning for Debian native-image build hosts

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use hostforge::util::shell::ColorChoice;
use hostforge::{ProvisionError, Shell};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<ProvisionError>()
            .map(ProvisionError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("hostforge=debug")
    } else {
        EnvFilter::new("hostforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, color));
    let config_path = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::Provision(args) => commands::provision::execute(&shell, config_path, args),
        Commands::Status(args) => commands::status::execute(config_path, args),
        Commands::Cleanup(args) => commands::cleanup::execute(&shell, config_path, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
