use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use snaplink::analytics::{ClickResolver, ClickTracker, GeoIpService};
use snaplink::config::Config;
use snaplink::{create_app, seed, storage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    info!("Initializing database...");
    let storage = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    if config.seed_demo_data {
        seed::seed_if_empty(storage.as_ref()).await?;
    }

    let geoip = GeoIpService::new(config.analytics.geoip_city_db_path.as_deref())?;
    if geoip.is_enabled() {
        info!("🌍 GeoIP lookups enabled");
    } else {
        info!("GeoIP database not configured, locations will be reported as Unknown");
    }

    let resolver = ClickResolver::new(Arc::new(geoip), config.analytics.ip_anonymization);
    let tracker = ClickTracker::spawn(
        Arc::clone(&storage),
        resolver,
        config.analytics.tracker_buffer_size,
    );

    let app = create_app(Arc::clone(&storage), tracker.clone(), &config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/links", addr);
    info!("   - Short links resolve at http://{}/r/<alias>", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Flushing pending clicks...");
    tracker.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
