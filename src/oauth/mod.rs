//! OAuth 2.0 authorization code flow for HubSpot.
//!
//! 1. Integrations UI posts (user_id, org_id) → [`HubSpotOAuth::authorize`]
//!    stores a state token and returns the HubSpot authorization URL
//! 2. User authorizes on HubSpot in a popup window
//! 3. HubSpot redirects to the callback → [`HubSpotOAuth::handle_callback`]
//!    verifies the state, exchanges the code, caches the token response
//! 4. Popup closes itself; the UI fetches the token once through
//!    [`HubSpotOAuth::get_credentials`]

mod exchange;
mod provider;
mod state;


pub use exchange::TokenResponse;
pub use provider::build_authorization_url;
pub use state::{generate_secret, OAuthState};

use crate::config::HubSpotConfig;
use crate::error::{IntegrationError, IntegrationResult};
use crate::store::{credentials_key, state_key, KeyValueStore};
use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Page returned to the popup after a successful exchange; it only closes itself.
pub const CLOSE_WINDOW_HTML: &str = r#"<html>
    <script>
        window.close();
    </script>
</html>
"#;

/// OAuth callback query parameters
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// HubSpot OAuth handshake: state issuance, callback verification, and
/// one-time credential pickup.
#[derive(Clone)]
pub struct HubSpotOAuth {
    config: Arc<HubSpotConfig>,
    store: Arc<dyn KeyValueStore>,
    http_client: Client,
}

impl HubSpotOAuth {
    pub fn new(
        config: Arc<HubSpotConfig>,
        store: Arc<dyn KeyValueStore>,
        http_client: Client,
    ) -> Self {
        Self {
            config,
            store,
            http_client,
        }
    }

    /// Start authorization for a (user, org) pair.
    ///
    /// Stores a fresh state token (replacing any earlier one for the pair)
    /// and returns the HubSpot authorization URL carrying it.
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> IntegrationResult<String> {
        let state = OAuthState::new(user_id, org_id);
        let encoded_state = state.to_json()?;

        self.store
            .set(
                &state_key(org_id, user_id),
                &encoded_state,
                Some(self.config.state_ttl()),
            )
            .await
            .context("Failed to store OAuth state")?;

        debug!(org_id = %org_id, user_id = %user_id, "OAuth state issued");

        Ok(build_authorization_url(&self.config, &encoded_state))
    }

    /// Handle HubSpot's redirect back to us.
    ///
    /// Returns the close-window HTML page on success.
    ///
    /// # Security
    /// - State must match the one stored for the (org, user) it names
    /// - State is deleted once the exchange starts (single-use)
    pub async fn handle_callback(&self, params: CallbackParams) -> IntegrationResult<String> {
        if let Some(error) = non_empty(params.error) {
            warn!(error = %error, "HubSpot authorization failed");
            return Err(IntegrationError::BadRequest(error));
        }

        let (code, raw_state) = match (non_empty(params.code), non_empty(params.state)) {
            (Some(code), Some(raw_state)) => (code, raw_state),
            _ => {
                return Err(IntegrationError::BadRequest(
                    "Missing code or state.".to_string(),
                ))
            }
        };

        let callback_state = OAuthState::from_callback(&raw_state)?;
        let org_id = callback_state.org_id.as_str();
        let user_id = callback_state.user_id.as_str();
        let key = state_key(org_id, user_id);

        let saved_secret = self
            .store
            .get(&key)
            .await
            .context("Failed to read OAuth state")?
            .and_then(|saved| serde_json::from_str::<OAuthState>(&saved).ok())
            .map(|saved| saved.state);

        if saved_secret.as_deref() != Some(callback_state.state.as_str()) {
            warn!(org_id = %org_id, user_id = %user_id, "OAuth state mismatch");
            return Err(IntegrationError::StateMismatch);
        }

        debug!(org_id = %org_id, user_id = %user_id, "OAuth state validated");

        // Both run to completion; the deletion does not depend on the exchange.
        let (exchanged, deleted) = tokio::join!(
            exchange::exchange_code_for_token(&self.http_client, &self.config, &code),
            self.store.delete(&key),
        );
        let token = exchanged?;
        deleted.context("Failed to delete OAuth state")?;

        let credentials =
            serde_json::to_string(&token).context("Failed to serialize token response")?;
        self.store
            .set(
                &credentials_key(org_id, user_id),
                &credentials,
                Some(self.config.credentials_ttl()),
            )
            .await
            .context("Failed to store credentials")?;

        info!(org_id = %org_id, user_id = %user_id, "HubSpot OAuth flow completed");

        Ok(CLOSE_WINDOW_HTML.to_string())
    }

    /// Pick up the credentials cached by the callback.
    ///
    /// The read is one-time: the entry is removed atomically, so a second
    /// call for the same handshake fails with `NotFound`.
    pub async fn get_credentials(&self, user_id: &str, org_id: &str) -> IntegrationResult<Value> {
        let not_found = || IntegrationError::NotFound("No credentials found.".to_string());

        let raw = self
            .store
            .take(&credentials_key(org_id, user_id))
            .await
            .context("Failed to read credentials")?
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(not_found)?;

        let credentials: Value =
            serde_json::from_str(&raw).context("Stored credentials are not valid JSON")?;
        if is_falsy(&credentials) {
            return Err(not_found());
        }

        debug!(org_id = %org_id, user_id = %user_id, "Credentials handed out");

        Ok(credentials)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Values that count as "no credentials": null, false, zero, and empty
/// strings, arrays, or objects.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
