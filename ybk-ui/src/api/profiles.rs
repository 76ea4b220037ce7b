//! Roster query endpoints
//!
//! Every mutating endpoint answers with the resulting query snapshot so the
//! front end can render without a second round trip. Search text updates are
//! accepted immediately; the filtered page follows after the debounce window.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ybk_common::query::QuerySnapshot;
use ybk_common::{DisplayRecord, SortDirection, SortField};

use crate::error::{ApiError, ApiResult};
use crate::store::LoadStatus;
use crate::AppState;

/// Load status plus the current query snapshot
#[derive(Debug, Serialize)]
pub struct ProfilesResponse {
    pub status: LoadStatus,
    #[serde(flatten)]
    pub snapshot: QuerySnapshot,
}

/// Result of a page move
#[derive(Debug, Serialize)]
pub struct PageResponse {
    /// False when the request was out of range and the page did not change
    pub moved: bool,
    #[serde(flatten)]
    pub snapshot: QuerySnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub field: String,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

async fn profiles_response(state: &AppState) -> ProfilesResponse {
    ProfilesResponse {
        status: state.store.status().await,
        snapshot: state.store.session().snapshot().await,
    }
}

/// GET /api/profiles
pub async fn get_profiles(State(state): State<AppState>) -> Json<ProfilesResponse> {
    Json(profiles_response(&state).await)
}

/// POST /api/profiles/load
///
/// Reloads the roster from the configured source. On failure the previous
/// collection stays in place and the error is returned as 502.
pub async fn load_profiles(State(state): State<AppState>) -> ApiResult<Json<ProfilesResponse>> {
    state.store.load().await?;
    Ok(Json(profiles_response(&state).await))
}

/// GET /api/profiles/:student_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<DisplayRecord>> {
    let engine = state.store.session().engine().await;
    engine
        .find(&student_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Profile {}", student_id)))
}

/// PUT /api/profiles/search
pub async fn set_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<ProfilesResponse>) {
    debug!(text = %request.text, "Search text updated");
    state.store.session().set_search_text(request.text).await;
    (StatusCode::ACCEPTED, Json(profiles_response(&state).await))
}

/// DELETE /api/profiles/search
pub async fn clear_search(State(state): State<AppState>) -> Json<ProfilesResponse> {
    state.store.session().clear_search().await;
    Json(profiles_response(&state).await)
}

/// PUT /api/profiles/sort
pub async fn set_sorting(
    State(state): State<AppState>,
    Json(request): Json<SortRequest>,
) -> ApiResult<Json<ProfilesResponse>> {
    let field: SortField = request.field.parse()?;
    let direction: SortDirection = match request.direction.as_deref() {
        Some(direction) => direction.parse()?,
        None => SortDirection::default(),
    };

    state
        .store
        .session()
        .engine()
        .await
        .set_sorting(field, direction);
    Ok(Json(profiles_response(&state).await))
}

/// POST /api/profiles/sort/toggle
pub async fn toggle_sort(State(state): State<AppState>) -> Json<ProfilesResponse> {
    state.store.session().engine().await.toggle_sort_direction();
    Json(profiles_response(&state).await)
}

/// POST /api/profiles/page
pub async fn go_to_page(
    State(state): State<AppState>,
    Json(request): Json<PageRequest>,
) -> Json<PageResponse> {
    let moved = state.store.session().engine().await.go_to_page(request.page);
    page_response(&state, moved).await
}

/// POST /api/profiles/page/next
pub async fn next_page(State(state): State<AppState>) -> Json<PageResponse> {
    let moved = state.store.session().engine().await.next_page();
    page_response(&state, moved).await
}

/// POST /api/profiles/page/prev
pub async fn prev_page(State(state): State<AppState>) -> Json<PageResponse> {
    let moved = state.store.session().engine().await.prev_page();
    page_response(&state, moved).await
}

async fn page_response(state: &AppState, moved: bool) -> Json<PageResponse> {
    Json(PageResponse {
        moved,
        snapshot: state.store.session().snapshot().await,
    })
}
