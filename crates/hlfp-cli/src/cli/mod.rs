//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use hlfp::{KubectlStore, LocalRunner, NetworkConfig, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Load network topology
    let config = Arc::new(NetworkConfig::load(&cli.config)?);

    // Unbounded fixed backoff unless the caller asked for a deadline
    let mut policy = RetryPolicy::default();
    if let Some(secs) = cli.deadline_secs {
        policy = policy.deadline(Duration::from_secs(secs));
    }

    let runner = Arc::new(LocalRunner);
    let ctx = commands::Context {
        config,
        store: Arc::new(KubectlStore::new(runner.clone())),
        runner,
        policy,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Admin(args) => commands::admin::execute(&ctx, args).await,
        Commands::Nodes(args) => commands::nodes::execute(&ctx, args).await,
        Commands::Genesis => commands::genesis::execute(&ctx).await,
        Commands::Channel => commands::channel::execute(&ctx).await,
    }
}
