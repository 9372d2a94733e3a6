use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events — SSE `update` whenever the schedule or a flag changes.
/// The data names the source: `files`, `control` or `schedule`. Lagged
/// receivers just miss updates; the next poll catches up.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let stream = BroadcastStream::new(app.event_tx.subscribe()).filter_map(|msg| {
        let source = msg.ok()?;
        Some(Ok::<Event, Infallible>(
            Event::default().event("update").data(source),
        ))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
