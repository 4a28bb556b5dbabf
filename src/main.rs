// ABOUTME: Entry point for the noderoll CLI application.
// ABOUTME: Parses arguments, resolves settings and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, NodeCommand, ServiceCommand};
use noderoll::config::Settings;
use noderoll::error::Result;
use noderoll::output::Output;
use std::env;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit status after an operator interrupt (128 + SIGINT).
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let mode = cli.output_mode();
    if let Err(e) = run(cli, &cancel).await {
        Output::new(mode).error(&e.to_string());
        let code = if e.is_cancelled() { EXIT_CANCELLED } else { 1 };
        std::process::exit(code);
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    let cwd = env::current_dir()?;
    let settings =
        Settings::resolve(cli.config.as_deref(), &cwd)?.with_overrides(cli.overrides())?;
    let output = Output::new(cli.output_mode());

    match cli.command {
        Commands::Node(NodeCommand::Ls { cluster }) => {
            commands::node::list(&cluster, &settings, output).await
        }
        Commands::Node(NodeCommand::Update {
            cluster,
            ids,
            status,
        }) => commands::node::update(&cluster, &ids, &status, &settings, output).await,
        Commands::Node(NodeCommand::Drain {
            cluster, ids, wait, ..
        }) => commands::node::drain(&cluster, &ids, wait, &settings, cancel, output).await,
        Commands::Node(NodeCommand::Renew { cluster, group, .. }) => {
            commands::renew(&cluster, &group, &settings, cancel, output).await
        }
        Commands::Service(ServiceCommand::Ls { cluster }) => {
            commands::service::list(&cluster, &settings, output).await
        }
    }
}
