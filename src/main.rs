//! King's Duel headless host
//!
//! Runs one local two-player session of the simulation. Commands arrive as
//! JSON lines on stdin, frames and errors leave as JSON lines on stdout, and
//! logs go to stderr.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kings_duel::config::{Config, LogFormat};
use kings_duel::game::{MatchEngine, Roster, SessionContext};
use kings_duel::host::{read_commands, write_messages, SessionRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level, config.log_format);

    let game_config = Arc::new(config.load_game_config()?);
    info!(
        fps = game_config.fps,
        wins_to_match = game_config.wins_to_match,
        snapshot_interval = config.snapshot_interval,
        "Starting King's Duel"
    );

    let session = SessionContext::new(Roster::standard(), config.fighters.clone());
    let engine = MatchEngine::new(game_config, session);

    let (command_tx, command_rx) = mpsc::channel(256);
    let (output_tx, output_rx) = mpsc::channel(64);

    let reader = tokio::spawn(read_commands(BufReader::new(tokio::io::stdin()), command_tx));
    let writer = tokio::spawn(write_messages(tokio::io::stdout(), output_rx));

    let runner = SessionRunner::new(engine, command_rx, output_tx, config.snapshot_interval);
    info!(session_id = %runner.id(), "Session created");

    let interrupted = tokio::select! {
        _ = runner.run() => false,
        _ = shutdown_signal() => true,
    };

    reader.abort();
    match writer.await {
        Ok(Err(e)) => warn!(error = %e, "Output writer failed"),
        Err(e) if !e.is_cancelled() => error!(error = %e, "Output writer panicked"),
        _ => {}
    }

    info!("Shutdown complete");
    if interrupted {
        // A blocking stdin read would otherwise hold the runtime open
        std::process::exit(0);
    }
    Ok(())
}

/// Initialize tracing/logging on stderr; stdout carries the protocol
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry.with(fmt_layer).init(),
        LogFormat::Json => registry.with(fmt_layer.json()).init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
