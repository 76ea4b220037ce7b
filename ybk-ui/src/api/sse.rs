//! Server-Sent Events (SSE) stream of roster changes

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams every RosterEvent (loads, search, sorting, paging) as it happens.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    ybk_common::sse::roster_event_stream(&state.events, "ybk-ui")
}
