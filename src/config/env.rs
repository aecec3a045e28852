use super::{ConnectorConfig, StoreBackend};
use anyhow::{bail, Result};

/// Overlay environment variables on top of file/default configuration.
///
/// Secrets are expected to arrive this way rather than through the config file.
/// Fails on a `CONNECTOR_STORE_BACKEND` that names no known backend.
pub fn apply_env_overrides(config: &mut ConnectorConfig) -> Result<()> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn apply_overrides<F>(config: &mut ConnectorConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("HUBSPOT_CLIENT_ID") {
        config.hubspot.client_id = v;
    }
    if let Some(v) = lookup("HUBSPOT_CLIENT_SECRET") {
        config.hubspot.client_secret = v;
    }
    if let Some(v) = lookup("HUBSPOT_REDIRECT_URI") {
        config.hubspot.redirect_uri = v;
    }
    if let Some(v) = lookup("CONNECTOR_BIND_ADDR") {
        config.server.bind_addr = v;
    }
    if let Some(v) = lookup("CONNECTOR_STORE_BACKEND") {
        match v.to_lowercase().as_str() {
            "memory" => config.store.backend = StoreBackend::Memory,
            "redis" => config.store.backend = StoreBackend::Redis,
            other => bail!("Unknown CONNECTOR_STORE_BACKEND '{}' (expected memory or redis)", other),
        }
    }
    if let Some(v) = lookup("REDIS_URL") {
        config.store.redis_url = v;
    }
    Ok(())
}
