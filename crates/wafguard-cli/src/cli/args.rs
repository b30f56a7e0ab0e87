//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// IP set admission and retention for web application firewalls
///
/// Configuration comes from the environment (SCOPE, IP_SET_NAME_BAD_BOTV4,
/// TABLE_NAME, ...) unless a TOML file is given with --config.
#[derive(Parser, Debug)]
#[command(name = "wafguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file (replaces environment configuration)
    #[arg(short, long, env = "WAFGUARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the store API base URL
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log at debug level regardless of LOG_LEVEL
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Admit the source address of a request event
    Access(EventArgs),

    /// Record retention for a set-mutation notification
    Retention(EventArgs),

    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug)]
pub struct EventArgs {
    /// JSON event file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub event: String,
}
