//! Public configuration endpoint
//!
//! Exposes the non-secret settings the front end needs, and whether the
//! service started in degraded mode because required settings were missing.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub title: String,
    pub base_url: String,
    pub debug: bool,
    pub cloud_name: Option<String>,
    pub degraded: bool,
    pub missing_settings: Vec<String>,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let settings = &state.settings;
    Json(ConfigResponse {
        title: settings.app.title.clone(),
        base_url: settings.app.base_url.clone(),
        debug: settings.app.debug,
        cloud_name: settings.cloud.cloud_name.clone(),
        degraded: !state.missing_settings.is_empty(),
        missing_settings: state.missing_settings.as_ref().clone(),
    })
}
