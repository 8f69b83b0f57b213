//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Hostforge - provisioning for Debian native-image build hosts
#[derive(Parser)]
#[command(name = "hostforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use (defaults to ~/.hostforge/config.toml)
    #[arg(long, global = true, env = "HOSTFORGE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision this host (requires root)
    Provision(ProvisionArgs),

    /// Report which components are already installed
    Status(StatusArgs),

    /// Run the cleanup sequence on its own (requires root)
    Cleanup(CleanupArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProvisionArgs {
    /// Route downloads through the configured proxy
    #[arg(long)]
    pub proxy: bool,

    /// Proxy endpoint for http traffic (implies --proxy)
    #[arg(long, env = "HOSTFORGE_PROXY_HTTP", value_name = "URL")]
    pub proxy_http: Option<String>,

    /// Proxy endpoint for https traffic (implies --proxy)
    #[arg(long, env = "HOSTFORGE_PROXY_HTTPS", value_name = "URL")]
    pub proxy_https: Option<String>,

    /// Skip the managed runtime and build tool
    #[arg(long)]
    pub no_runtime: bool,

    /// Skip the native-image toolchain (static libc, zlib, packer)
    #[arg(long)]
    pub no_native: bool,

    /// Print the step plan without installing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the build working directory after cleanup
    #[arg(long)]
    pub keep_build_dir: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanupArgs {
    /// Keep the build working directory
    #[arg(long)]
    pub keep_build_dir: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
