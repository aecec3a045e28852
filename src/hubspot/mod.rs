pub mod api;
pub mod transformer;

use crate::config::HubSpotConfig;
use crate::error::{IntegrationError, IntegrationResult};
use crate::item::IntegrationItem;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use self::api::HubSpotClient;
use self::transformer::contact_to_item;

/// HubSpot item loader - reads one page of CRM contacts with the credentials
/// produced by the OAuth handshake and maps them to integration items.
#[derive(Clone)]
pub struct HubSpotConnector {
    config: Arc<HubSpotConfig>,
    http_client: Client,
}

impl HubSpotConnector {
    pub fn new(config: Arc<HubSpotConfig>, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Load contacts as integration items, in HubSpot's order.
    ///
    /// `credentials` is the serialized token response handed to the UI by
    /// the credential pickup.
    pub async fn get_items(&self, credentials: &str) -> IntegrationResult<Vec<IntegrationItem>> {
        let access_token = access_token_from(credentials)?;
        let client = HubSpotClient::new(self.http_client.clone(), access_token, &self.config);

        let items: Vec<IntegrationItem> = client
            .fetch_contacts()
            .await?
            .iter()
            .map(contact_to_item)
            .collect();

        tracing::debug!(count = items.len(), "HubSpot contacts translated");
        Ok(items)
    }
}

/// Pull a non-empty `access_token` out of serialized credentials.
fn access_token_from(credentials: &str) -> IntegrationResult<String> {
    let credentials: Value = serde_json::from_str(credentials)
        .map_err(|_| IntegrationError::BadRequest("Invalid credentials.".to_string()))?;

    credentials
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            IntegrationError::BadRequest("Missing access_token in credentials.".to_string())
        })
}
