//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::{Context as _, Result};
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wafguard::GuardConfig;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GuardConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GuardConfig::from_env().context("invalid environment configuration")?,
    };
    if let Some(url) = cli.store_url {
        config.store_url = Some(url);
    }

    init_logging(&config, cli.verbose);

    let ctx = commands::Context {
        config,
        output_format: cli.output.unwrap_or_default(),
    };

    match cli.command {
        Commands::Access(args) => commands::access::execute(ctx, args).await,
        Commands::Retention(args) => commands::retention::execute(ctx, args).await,
        Commands::Config => commands::config::execute(&ctx),
    }
}

// Logs go to stderr so stdout stays machine-readable.
fn init_logging(config: &GuardConfig, verbose: bool) {
    let directive = if verbose { "debug" } else { config.log_level.as_str() };
    let env_filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
