//! HTTP API for the HubSpot integration.
//!
//! Routes (all under `/integrations/hubspot`):
//! - `POST /authorize` - form `user_id`, `org_id` → authorization URL (JSON string)
//! - `GET  /oauth2callback` - HubSpot redirect target → close-window HTML
//! - `POST /credentials` - form `user_id`, `org_id` → token response (one-time)
//! - `POST /load` - form `credentials` → integration items

use crate::error::IntegrationError;
use crate::hubspot::HubSpotConnector;
use crate::item::IntegrationItem;
use crate::oauth::{CallbackParams, HubSpotOAuth};
use axum::{
    extract::{Form, Query, State},
    http::{HeaderValue, Method},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// Shared application state for the integration API
#[derive(Clone)]
pub struct ApiState {
    pub oauth: HubSpotOAuth,
    pub connector: HubSpotConnector,
}

/// Form identifying whose handshake an operation belongs to
#[derive(Debug, Deserialize)]
pub struct UserOrgForm {
    pub user_id: String,
    pub org_id: String,
}

/// Form carrying serialized credentials for item loading
#[derive(Debug, Deserialize)]
pub struct LoadForm {
    pub credentials: String,
}

/// Create the integration API router
///
/// `allowed_origins` lists browser origins permitted to call the API; an
/// empty list disables the CORS layer.
pub fn create_router(state: ApiState, allowed_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth2callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .route("/integrations/hubspot/load", post(load_items))
        .with_state(Arc::new(state));

    match cors_layer(allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(tower_http::cors::Any),
    )
}

/// POST /integrations/hubspot/authorize
async fn authorize(
    State(state): State<Arc<ApiState>>,
    Form(form): Form<UserOrgForm>,
) -> Result<Json<String>, IntegrationError> {
    debug!(org_id = %form.org_id, user_id = %form.user_id, "Authorization requested");
    let url = state.oauth.authorize(&form.user_id, &form.org_id).await?;
    Ok(Json(url))
}

/// GET /integrations/hubspot/oauth2callback
async fn oauth2callback(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>, IntegrationError> {
    debug!("OAuth callback received");
    let page = state.oauth.handle_callback(params).await?;
    Ok(Html(page))
}

/// POST /integrations/hubspot/credentials
async fn credentials(
    State(state): State<Arc<ApiState>>,
    Form(form): Form<UserOrgForm>,
) -> Result<Json<Value>, IntegrationError> {
    let credentials = state
        .oauth
        .get_credentials(&form.user_id, &form.org_id)
        .await?;
    Ok(Json(credentials))
}

/// POST /integrations/hubspot/load
async fn load_items(
    State(state): State<Arc<ApiState>>,
    Form(form): Form<LoadForm>,
) -> Result<Json<Vec<IntegrationItem>>, IntegrationError> {
    let items = state.connector.get_items(&form.credentials).await?;
    Ok(Json(items))
}
