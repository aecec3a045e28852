use crate::config::HubSpotConfig;
use crate::error::{IntegrationError, IntegrationResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Contact properties requested from the CRM.
///
/// Numbers and booleans are kept as their text; any other non-string value
/// reads as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ContactProperties {
    #[serde(default, deserialize_with = "lenient_string")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

/// HubSpot CRM contact record.
#[derive(Debug, Default, Deserialize)]
pub struct HubSpotContact {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub properties: Option<ContactProperties>,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
}

/// One page of the contacts listing. Records are decoded one at a time so a
/// single odd record cannot sink the page.
#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    results: Vec<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Decode each listing record, skipping the ones that are not contacts.
fn decode_contacts(results: Vec<Value>) -> Vec<HubSpotContact> {
    results
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(contact) => Some(contact),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable HubSpot contact record");
                None
            }
        })
        .collect()
}

/// HTTP client for the HubSpot CRM v3 API.
///
/// Authenticates with the Bearer access token from the OAuth handshake.
pub struct HubSpotClient {
    access_token: String,
    http_client: Client,
    base_url: String,
    page_limit: u32,
    properties: String,
}

impl HubSpotClient {
    pub fn new(http_client: Client, access_token: String, config: &HubSpotConfig) -> Self {
        Self {
            access_token,
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
            properties: config.contact_properties.join(","),
        }
    }

    /// Fetch the first page of contacts.
    ///
    /// Only a 200 is read; any other status yields an empty list.
    pub async fn fetch_contacts(&self) -> IntegrationResult<Vec<HubSpotContact>> {
        let url = format!("{}/crm/v3/objects/contacts", self.base_url);
        let limit = self.page_limit.to_string();
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .query(&[("limit", limit.as_str()), ("properties", self.properties.as_str())])
            .send()
            .await
            .map_err(|e| {
                IntegrationError::Upstream(format!("Failed to send contacts request: {}", e))
            })?;

        if response.status() != StatusCode::OK {
            warn!(
                status = %response.status(),
                "HubSpot contacts listing failed, returning no items"
            );
            return Ok(Vec::new());
        }

        let page: ContactsPage = response.json().await.map_err(|e| {
            IntegrationError::Upstream(format!("Failed to parse contacts response: {}", e))
        })?;
        Ok(decode_contacts(page.results))
    }
}
