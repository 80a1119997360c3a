use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;
use tagrelay_pcsc::{CardSubsystem, PcscSubsystem};
use tagrelay_session::{SessionOrchestrator, StdinPrompt};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::filter::LevelFilter;

mod cli;
mod config;

use cli::{Cli, Command};
use config::Settings;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let settings = Settings::load(&cli)?;
    debug!(?settings, "Loaded settings");

    let subsystem = Arc::new(
        PcscSubsystem::establish().wrap_err("Failed to establish PC/SC context")?,
    );

    let result = match cli.command.unwrap_or_default() {
        Command::Run => run(Arc::clone(&subsystem), &settings).await,
        Command::List => list_readers(&*subsystem),
    };

    release(subsystem);
    result
}

async fn run(subsystem: Arc<PcscSubsystem>, settings: &Settings) -> eyre::Result<()> {
    let target = settings.target()?;
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    let mut orchestrator = SessionOrchestrator::new(
        subsystem,
        StdinPrompt,
        target,
        settings.session_config(),
        info_span!("session"),
    );
    orchestrator.run(&cancel).await;

    Ok(())
}

fn list_readers(subsystem: &PcscSubsystem) -> eyre::Result<()> {
    let readers = subsystem.list_readers().wrap_err("Failed to list readers")?;

    if readers.is_empty() {
        println!("No readers found!");
        return Ok(());
    }

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        println!("{}. {}", i + 1, reader);
    }

    Ok(())
}

/// Cancel `cancel` on SIGINT or SIGTERM
async fn shutdown_on_signal(cancel: CancellationToken) {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }

    warn!("Shutdown signal received, stopping");
    cancel.cancel();
}

fn release(subsystem: Arc<PcscSubsystem>) {
    match Arc::try_unwrap(subsystem) {
        Ok(subsystem) => match subsystem.release() {
            Ok(()) => info!("PC/SC context released"),
            Err(e) => warn!(error = %e, "Failed to release PC/SC context"),
        },
        Err(_) => warn!("PC/SC context still in use, leaving it to the system"),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_ansi(true)
        .init();
}
