//! OAuth token exchange logic.
//!
//! Handles exchanging authorization codes for access tokens.

use crate::config::HubSpotConfig;
use crate::error::{IntegrationError, IntegrationResult};
use reqwest::Client;
use serde_json::{Map, Value};

/// Raw token response, kept verbatim as the stored credential
pub type TokenResponse = Map<String, Value>;

/// Exchange an authorization code for an access token.
///
/// Returns the provider's JSON object untouched (access token, refresh
/// token, expiry and whatever else HubSpot includes).
///
/// # Errors
/// * `Upstream` - transport failure, non-success status (raw body included),
///   or a success body that is not a JSON object
pub async fn exchange_code_for_token(
    client: &Client,
    config: &HubSpotConfig,
    code: &str,
) -> IntegrationResult<TokenResponse> {
    let form_data = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];

    tracing::debug!("Exchanging authorization code for token at {}", config.token_url);

    let response = client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .map_err(|e| {
            IntegrationError::Upstream(format!("Failed to reach HubSpot token endpoint: {}", e))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = %status, "HubSpot token exchange rejected");
        return Err(IntegrationError::Upstream(format!(
            "Failed to get HubSpot token: {}",
            body
        )));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        IntegrationError::Upstream(format!("Failed to parse HubSpot token response: {}", e))
    })?;

    tracing::debug!(
        has_refresh_token = token.contains_key("refresh_token"),
        expires_in = ?token.get("expires_in"),
        "Token exchange successful"
    );

    Ok(token)
}
