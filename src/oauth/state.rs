//! OAuth state token for CSRF protection.
//!
//! The state travels to HubSpot and back as a JSON object carrying a random
//! secret and the (user, org) pair it was issued for. The same JSON is kept in
//! the store under `state:{org_id}:{user_id}` until the callback consumes it.

use crate::error::{IntegrationError, IntegrationResult};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Random bytes behind each secret (43 url-safe characters once encoded)
const SECRET_BYTES: usize = 32;

/// State object round-tripped through the authorization redirect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Random CSRF secret
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl OAuthState {
    /// Issue a fresh state for a (user, org) pair.
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            state: generate_secret(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize OAuth state")
    }

    /// Parse the `state` query parameter handed back by the provider.
    ///
    /// `raw` is the value the query extractor already decoded and is parsed
    /// as-is, so ids keep any `+` or `%XX` they contain. Only when that fails
    /// is it decoded once more (`+` as space, then percent escapes), for
    /// clients that encoded the state twice.
    pub fn from_callback(raw: &str) -> IntegrationResult<Self> {
        let invalid = || IntegrationError::BadRequest("Invalid state".to_string());

        if let Ok(state) = serde_json::from_str(raw) {
            return Ok(state);
        }

        let spaced = raw.replace('+', " ");
        let decoded = urlencoding::decode(&spaced).map_err(|_| invalid())?;
        serde_json::from_str(&decoded).map_err(|_| invalid())
    }
}

/// Generate a url-safe random secret from the OS-seeded thread RNG.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 43);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_new_binds_user_and_org() {
        let state = OAuthState::new("user1", "org1");
        assert_eq!(state.user_id, "user1");
        assert_eq!(state.org_id, "org1");
        assert!(!state.state.is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let state = OAuthState {
            state: "s3cr3t".to_string(),
            user_id: "u".to_string(),
            org_id: "o".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(json["state"], "s3cr3t");
        assert_eq!(json["user_id"], "u");
        assert_eq!(json["org_id"], "o");
    }

    #[test]
    fn test_from_callback_plain_json() {
        let parsed =
            OAuthState::from_callback(r#"{"state":"abc","user_id":"u","org_id":"o"}"#).unwrap();
        assert_eq!(parsed.state, "abc");
        assert_eq!(parsed.user_id, "u");
        assert_eq!(parsed.org_id, "o");
    }

    #[test]
    fn test_from_callback_keeps_plus_and_percent_in_ids() {
        let raw = r#"{"state":"abc","user_id":"john+test@x.com","org_id":"org%41"}"#;
        let parsed = OAuthState::from_callback(raw).unwrap();
        assert_eq!(parsed.user_id, "john+test@x.com");
        assert_eq!(parsed.org_id, "org%41");
    }

    #[test]
    fn test_from_callback_double_encoded_fallback() {
        let raw = "%7B%22state%22%3A+%22abc%22%2C+%22user_id%22%3A+%22u%22%2C+%22org_id%22%3A+%22o%22%7D";
        let parsed = OAuthState::from_callback(raw).unwrap();
        assert_eq!(parsed.state, "abc");
        assert_eq!(parsed.org_id, "o");
    }

    #[test]
    fn test_from_callback_rejects_garbage() {
        let err = OAuthState::from_callback("not-json").unwrap_err();
        assert!(matches!(err, IntegrationError::BadRequest(ref m) if m == "Invalid state"));
    }

    #[test]
    fn test_from_callback_rejects_missing_fields() {
        let err = OAuthState::from_callback(r#"{"state":"abc"}"#).unwrap_err();
        assert!(matches!(err, IntegrationError::BadRequest(_)));
    }
}
