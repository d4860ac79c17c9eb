//! gable-server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gable_server::routes::{AppState, build_router};
use gable_server::{build_app, load_settings};
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Autonomous tenancy management agent server.
#[derive(Debug, Parser)]
#[command(name = "gable-server", version)]
struct Cli {
    /// Path to a JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the SQLite database path.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.database.path = db;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind_addr = bind;
    }

    gable_server::telemetry::init_tracing(&settings.logging);
    let metrics = gable_server::telemetry::install_metrics_recorder()?;

    let runner = build_app(&settings)?;
    let router = build_router(AppState {
        runner: Arc::clone(&runner),
        metrics,
    });

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr).await?;
    info!(addr = %settings.server.bind_addr, "gable-server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                let _ = signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
