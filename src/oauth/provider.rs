//! HubSpot authorization URL construction.

use crate::config::HubSpotConfig;

/// Build the URL the browser is sent to, with `state` attached.
pub fn build_authorization_url(config: &HubSpotConfig, state: &str) -> String {
    let scopes = config.scopes.join(" ");
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&scopes),
        urlencoding::encode(state)
    )
}
