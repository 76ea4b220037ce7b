//! ybk-ui library - roster service
//!
//! Serves the yearbook roster to the front end: loads the roster JSON, keeps
//! the search/sort/page state, and streams changes over SSE.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use ybk_common::config::Settings;
use ybk_common::events::EventBus;

pub mod api;
pub mod error;
pub mod gallery;
pub mod source;
pub mod store;

pub use error::{ApiError, ApiResult, LoadError};
pub use store::{LoadStatus, RosterStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Roster source, query session and load status
    pub store: Arc<RosterStore>,
    /// Environment settings read at startup
    pub settings: Arc<Settings>,
    /// Required settings that were absent at startup (degraded mode when non-empty)
    pub missing_settings: Arc<Vec<String>>,
    /// Roster change notifications for SSE
    pub events: EventBus,
}

impl AppState {
    pub fn new(
        store: RosterStore,
        settings: Settings,
        missing_settings: Vec<String>,
        events: EventBus,
    ) -> Self {
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
            missing_settings: Arc::new(missing_settings),
            events,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let profiles = Router::new()
        .route("/api/profiles", get(api::get_profiles))
        .route("/api/profiles/load", post(api::load_profiles))
        .route(
            "/api/profiles/search",
            put(api::set_search).delete(api::clear_search),
        )
        .route("/api/profiles/sort", put(api::set_sorting))
        .route("/api/profiles/sort/toggle", post(api::toggle_sort))
        .route("/api/profiles/page", post(api::go_to_page))
        .route("/api/profiles/page/next", post(api::next_page))
        .route("/api/profiles/page/prev", post(api::prev_page))
        .route("/api/profiles/:student_id", get(api::get_profile));

    let gallery = Router::new()
        .route("/api/gallery", get(api::list_gallery))
        .route("/api/gallery/:id", get(api::get_gallery_photo));

    Router::new()
        .merge(profiles)
        .merge(gallery)
        .route("/api/config", get(api::get_config))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
