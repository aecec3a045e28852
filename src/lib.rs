// Configuration (TOML file + environment overrides)
pub mod config;

// Error taxonomy and HTTP mapping
pub mod error;

// Short-lived key-value storage for state tokens and credentials
pub mod store;

// OAuth handshake: authorize, callback, credential pickup
pub mod oauth;

// HubSpot contacts listing and translation
pub mod hubspot;

// Generic integration item shape
pub mod item;

// HTTP API
pub mod api;

pub use config::ConnectorConfig;
pub use error::{IntegrationError, IntegrationResult};
pub use item::IntegrationItem;
