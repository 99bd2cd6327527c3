// fluxcache - offline-first caching front for the fluxlove portfolio
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use fluxcache::cache::MemoryStorage;
use fluxcache::cli::Args;
use fluxcache::config::AppConfig;
use fluxcache::network::OriginClient;
use fluxcache::router::{CacheRouter, RouterConfig};
use fluxcache::server::create_router;
use fluxcache::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags on top
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(origin) = &args.origin {
        config.origin.base_url = origin.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting fluxcache v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(run(config, args.skip_install))
}

async fn run(config: AppConfig, skip_install: bool) -> Result<()> {
    // Phase 3: Build the router around in-memory partitions and the origin client
    let origin = OriginClient::new(&config.origin, &config.performance)?;
    info!("Origin: {}", origin.base_url());

    let router = CacheRouter::new(
        RouterConfig::from_app(&config)?,
        Arc::new(MemoryStorage::new()),
        Arc::new(origin.clone()),
    );

    // Phase 4: Lifecycle - install, then activate and claim clients
    if skip_install {
        info!("Skipping pre-cache of critical resources");
        router.skip_waiting();
    } else {
        let report = router.install().await;
        if let Some(error) = report.error {
            warn!("Continuing without pre-cached shell: {}", error);
        }
    }
    let swept = router.activate().await;
    if !swept.is_empty() {
        info!("Removed {} outdated cache partitions", swept.len());
    }

    // Phase 5: Build and start HTTP server
    let app = create_router(&config, router, origin)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
