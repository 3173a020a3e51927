//! Mountable Cache - cache service process
//!
//! Builds the cache with an in-memory and a document-backed mount and keeps
//! the eviction sweeper running until shutdown.

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mountable_cache::store::{DocumentStore, MemoryStore};
use mountable_cache::{Cache, CacheBuilder, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the document database
/// 4. Build the cache with its mounts and start the sweeper
/// 5. Wait for SIGINT/SIGTERM, then stop the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mountable_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mountable Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: sweep_interval={}s, sweep_timeout={}s, document_path={}",
        config.sweep_interval,
        config.sweep_timeout,
        config.document_path.display()
    );

    let documents = DocumentStore::open(&config.document_path, &config.document_collection)
        .with_context(|| {
            format!(
                "failed to open document store at {}",
                config.document_path.display()
            )
        })?;

    let shutdown = CancellationToken::new();
    let cache = CacheBuilder::from_config(&config)
        .mount(config.memory_mount.clone(), MemoryStore::new())
        .mount(config.persist_mount.clone(), documents)
        .build(shutdown.clone())
        .context("failed to build cache")?;
    info!("Cache ready with mounts {:?}", cache.mounts());

    shutdown_signal().await;
    stop(&cache).await;

    info!("Shutdown complete");
    Ok(())
}

async fn stop(cache: &Cache) {
    cache.shutdown().await;
    let stats = cache.stats();
    info!(
        "Final stats: writes={}, hits={}, misses={}, evicted={}",
        stats.writes, stats.hits, stats.misses, stats.evicted
    );
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
