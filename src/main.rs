use anyhow::{Context, Result};
use hubspot_connector::api::{create_router, ApiState};
use hubspot_connector::config::{apply_env_overrides, load_config, ConnectorConfig, StoreBackend};
use hubspot_connector::hubspot::HubSpotConnector;
use hubspot_connector::oauth::HubSpotOAuth;
use hubspot_connector::store::{run_expiry_sweep, KeyValueStore, MemoryStore, RedisStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hubspot_connector=info".into()),
        )
        .init();

    info!("HubSpot connector starting...");

    let config_path =
        std::env::var("CONNECTOR_CONFIG").unwrap_or_else(|_| "connector.toml".to_string());
    let mut config = if Path::new(&config_path).exists() {
        load_config(&config_path)?
    } else {
        info!(path = %config_path, "No config file, using defaults");
        ConnectorConfig::default()
    };
    apply_env_overrides(&mut config).context("Invalid environment configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        bind_addr = %config.server.bind_addr,
        store = ?config.store.backend,
        redirect_uri = %config.hubspot.redirect_uri,
        "Configuration loaded"
    );

    let store: Arc<dyn KeyValueStore> = match config.store.backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            tokio::spawn(run_expiry_sweep(
                store.clone(),
                config.store.sweep_interval_seconds,
            ));
            Arc::new(store)
        }
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.store.redis_url, config.store.key_prefix.clone())
                .await
                .context("Failed to initialize redis store")?,
        ),
    };
    info!("Key-value store initialized");

    let hubspot_config = Arc::new(config.hubspot.clone());
    let http_client = reqwest::Client::new();
    let api_state = ApiState {
        oauth: HubSpotOAuth::new(Arc::clone(&hubspot_config), store, http_client.clone()),
        connector: HubSpotConnector::new(hubspot_config, http_client),
    };
    let router = create_router(api_state, &config.server.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .context("Failed to bind API address")?;
    info!(addr = %config.server.bind_addr, "Integration API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Integration API server error")?;

    info!("HubSpot connector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
        // Keep serving rather than shutting down immediately
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
