use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grabbit_core::{
    load_config, validate_config, DecisionStore, DownloadDispatcher, DownloadService,
    ProwlarrSearcher, QbittorrentClient, SabnzbdClient, Scheduler, Searcher, SqliteStore,
};

use grabbit_server::api::create_router;
use grabbit_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("GRABBIT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Config hash for correlating logs with deployed configuration
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Create the SQLite decision store
    let store: Arc<dyn DecisionStore> = Arc::new(
        SqliteStore::new(&config.database.path).context("Failed to create decision store")?,
    );
    info!("Decision store initialized");

    // Create searcher if configured
    let searcher: Option<Arc<dyn Searcher>> = match &config.prowlarr {
        Some(prowlarr_config) => {
            info!("Initializing Prowlarr searcher at {}", prowlarr_config.url);
            Some(Arc::new(
                ProwlarrSearcher::new(prowlarr_config.clone())
                    .context("Failed to create Prowlarr searcher")?,
            ))
        }
        None => {
            info!("No search provider configured");
            None
        }
    };

    // Create download clients
    let mut download_services: Vec<Arc<dyn DownloadService>> = Vec::new();
    if let Some(qbit_config) = &config.download.qbittorrent {
        info!("Initializing qBittorrent client at {}", qbit_config.url);
        download_services.push(Arc::new(
            QbittorrentClient::new(qbit_config.clone())
                .context("Failed to create qBittorrent client")?,
        ));
    }
    if let Some(sab_config) = &config.download.sabnzbd {
        info!("Initializing SABnzbd client at {}", sab_config.url);
        download_services.push(Arc::new(
            SabnzbdClient::new(sab_config.clone()).context("Failed to create SABnzbd client")?,
        ));
    }
    if download_services.is_empty() {
        info!("No download clients configured; grabs will be report-only failures");
    }
    let downloads = Arc::new(DownloadDispatcher::new(download_services));

    // Create the scheduler. Free-space probing is deployment-specific, so
    // no storage monitor is wired here and the guard stays disabled.
    let scheduler = Arc::new(Scheduler::new(
        config.scheduler.clone(),
        Arc::clone(&store),
        searcher
            .clone()
            .unwrap_or_else(|| Arc::new(NullSearcher) as Arc<dyn Searcher>),
        downloads,
        None,
        config.download.category.clone(),
    ));

    if config.scheduler.enabled {
        if searcher.is_some() {
            scheduler.start();
            info!("Decision scheduler started");
        } else {
            error!("Scheduler enabled but no search provider configured; not starting");
        }
    } else {
        info!("Scheduler disabled in config");
    }

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        searcher,
        Arc::clone(&scheduler),
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop().await;

    Ok(())
}

/// Placeholder searcher used when none is configured; every call fails and
/// the failure is handled like any other provider error.
struct NullSearcher;

#[async_trait::async_trait]
impl Searcher for NullSearcher {
    fn name(&self) -> &str {
        "none"
    }

    async fn search(
        &self,
        _request: &grabbit_core::SearchRequest,
    ) -> Result<Vec<grabbit_core::RawSearchResult>, grabbit_core::SearchError> {
        Err(grabbit_core::SearchError::Internal(
            "no search provider configured".to_string(),
        ))
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
