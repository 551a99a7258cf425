//! `Teramorph` server entry point.
//!
//! Picks the contact store, builds the shared state and serves the router
//! with graceful shutdown on SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use teramorph_core::clock::SystemClock;
use teramorph_core::csrf::RandomTokenSource;
use teramorph_server::config::{ServerConfig, StorageBackendType};
use teramorph_server::routes;
use teramorph_server::state::AppState;
use teramorph_storage::{ContactStore, CsvFileStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "Teramorph starting");

    let state = Arc::new(build_app_state(&config));
    let app = routes::app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Teramorph server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Teramorph server stopped");
    Ok(())
}

/// Build the shared application state for `config`.
///
/// The CSV store resolves its private directory on first use, so a
/// misconfigured public root shows up as a storage failure per request
/// rather than a startup error.
fn build_app_state(config: &ServerConfig) -> AppState {
    let store: Arc<dyn ContactStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (submissions will not persist)");
            Arc::new(MemoryStore::new())
        }
        StorageBackendType::Csv {
            public_root,
            dir_name,
            file_name,
        } => {
            info!(
                public_root = %public_root.display(),
                dir = %dir_name,
                file = %file_name,
                "using CSV file storage"
            );
            Arc::new(CsvFileStore::new(public_root, dir_name.clone(), file_name.clone()))
        }
    };

    AppState::new(
        config,
        store,
        Arc::new(SystemClock),
        Arc::new(RandomTokenSource),
    )
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
