use checkin_service::config::CheckinConfig;
use checkin_service::services::{
    metrics::init_metrics, GeoProvider, HttpGeoProvider, Ledger, MemoryLedger, NoopGeoProvider,
    RestLedger, TokenAuthority,
};
use checkin_service::{build_router, AppState};
use dotenvy::dotenv;
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = CheckinConfig::from_env().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(&config.service_name, &config.log_level);
    init_metrics();

    let ledger: Arc<dyn Ledger> = if config.ledger.enabled {
        let ledger = RestLedger::connect(config.ledger.clone()).await.map_err(|e| {
            tracing::error!("Failed to connect to ledger store: {}", e);
            anyhow::anyhow!("Ledger error: {}", e)
        })?;
        Arc::new(ledger)
    } else {
        tracing::info!("Remote ledger disabled, using in-memory ledger");
        Arc::new(MemoryLedger::new())
    };

    let geo: Arc<dyn GeoProvider> = if config.geo.enabled {
        let provider = HttpGeoProvider::new(config.geo.clone())
            .map_err(|e| anyhow::anyhow!("Failed to build geolocation client: {}", e))?;
        tracing::info!(base_url = %config.geo.base_url, "Geolocation lookup enabled");
        Arc::new(provider)
    } else {
        tracing::info!("Geolocation lookup disabled");
        Arc::new(NoopGeoProvider)
    };

    let state = AppState {
        tokens: Arc::new(TokenAuthority::new()),
        ledger,
        geo,
        checkin_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.checkin_attempts,
            config.rate_limit.checkin_window_seconds,
        ),
        ip_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
        config: config.clone(),
    };

    let app = build_router(state);

    let address = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    let listener = tokio::net::TcpListener::bind(address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting {} on {}", config.service_name, address);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
