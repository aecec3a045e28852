pub mod env;
pub use env::apply_env_overrides;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Complete connector configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub hubspot: HubSpotConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Origins allowed to call the API from a browser (the integrations UI)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Which key-value backend holds state tokens and credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Key-value store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default)]
    pub key_prefix: String,
    /// How often the memory backend drops expired entries
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: default_redis_url(),
            key_prefix: String::new(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// HubSpot OAuth app and API settings
#[derive(Clone, Deserialize)]
pub struct HubSpotConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_ttl")]
    pub state_ttl_seconds: u64,
    #[serde(default = "default_ttl")]
    pub credentials_ttl_seconds: u64,
    /// Contacts requested by the single listing call
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_contact_properties")]
    pub contact_properties: Vec<String>,
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/integrations/hubspot/oauth2callback".to_string()
}

fn default_auth_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubspot.com/oauth/v1/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.hubspot.com".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "crm.objects.contacts.read".to_string(),
        "crm.objects.companies.read".to_string(),
    ]
}

fn default_ttl() -> u64 {
    600
}

fn default_page_limit() -> u32 {
    50
}

fn default_contact_properties() -> Vec<String> {
    vec![
        "firstname".to_string(),
        "lastname".to_string(),
        "email".to_string(),
    ]
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            state_ttl_seconds: default_ttl(),
            credentials_ttl_seconds: default_ttl(),
            page_limit: default_page_limit(),
            contact_properties: default_contact_properties(),
        }
    }
}

// Manual Debug so the client secret never reaches the logs.
impl std::fmt::Debug for HubSpotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubSpotConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("scopes", &self.scopes)
            .field("state_ttl_seconds", &self.state_ttl_seconds)
            .field("credentials_ttl_seconds", &self.credentials_ttl_seconds)
            .field("page_limit", &self.page_limit)
            .field("contact_properties", &self.contact_properties)
            .finish()
    }
}

impl HubSpotConfig {
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_seconds)
    }

    pub fn credentials_ttl(&self) -> Duration {
        Duration::from_secs(self.credentials_ttl_seconds)
    }
}

impl ConnectorConfig {
    /// Reject configurations the connector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hubspot.client_id.is_empty() {
            bail!("hubspot.client_id is not set (config file or HUBSPOT_CLIENT_ID)");
        }
        if self.hubspot.client_secret.is_empty() {
            bail!("hubspot.client_secret is not set (config file or HUBSPOT_CLIENT_SECRET)");
        }
        if self.hubspot.state_ttl_seconds == 0 || self.hubspot.credentials_ttl_seconds == 0 {
            bail!("hubspot TTLs must be greater than zero");
        }
        if self.hubspot.page_limit == 0 {
            bail!("hubspot.page_limit must be greater than zero");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConnectorConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ConnectorConfig =
        toml::from_str(&contents).context("Failed to parse config file")?;
    Ok(config)
}
