//! Peer-to-Peer Balance Transfer Ledger Service
//!
//! HTTP server exposing the ledger over a JSON API.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --db peerpay.db --bind 0.0.0.0:5000
//! cargo run -- --db peerpay.db --smtp-server smtp.example.com --smtp-username relay
//! ```
//!
//! The server opens (or creates) the SQLite ledger at the given path, serves
//! the API until interrupted, and closes the store on shutdown. When an SMTP
//! relay is configured, transaction notifications are emailed to the
//! receiver; otherwise the intents are logged only.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (database unreadable, bind address in use, etc.)

use std::process;
use std::sync::Arc;

use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use peerpay::api;
use peerpay::cli::{self, CliArgs};
use peerpay::core::{LedgerEngine, LedgerStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "peerpay=info".into()),
        )
        .init();

    let args = cli::parse_args();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = LedgerStore::open(&args.database)?;
    info!(database = %args.database.display(), "ledger store opened");

    let engine = Arc::new(LedgerEngine::new(store, args.notifier()));
    let app = api::router(engine);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(address = %args.bind, "serving ledger API");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolve when the process receives Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
