//! Thumb Gallery - a JPEG photo gallery server
//!
//! Serves a directory of JPEGs with cached 800px thumbnails.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thumb_gallery::{create_router, spawn_cleanup_task, AppState, CacheStore, Config};

/// Serve a directory of JPEG photos with cached thumbnails.
#[derive(Parser, Debug)]
#[command(name = "thumb_gallery", version, about)]
struct Cli {
    /// Directory containing the photos to serve
    #[arg(default_value = ".")]
    directory: PathBuf,
}

/// Main entry point for the gallery server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from the command line and environment
/// 3. Open the thumbnail store (fatal on failure)
/// 4. Start background TTL cleanup task
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to debug for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thumb_gallery=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().with_directory(cli.directory);
    info!(
        "Configuration loaded: directory={}, cache_path={}, port={}, ttl={}s, cleanup_interval={}s",
        config.directory.display(),
        config.cache_path.display(),
        config.server_port,
        config.thumbnail_ttl,
        config.cleanup_interval
    );

    let store = CacheStore::open(&config.cache_path).with_context(|| {
        format!(
            "failed to open thumbnail cache at {}",
            config.cache_path.display()
        )
    })?;
    info!("Thumbnail store opened");

    let cleanup_handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);

    let state = AppState::from_config(&config, store);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(directory = %config.directory.display(), "Serving images on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
