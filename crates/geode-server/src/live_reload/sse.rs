//! Server-sent events endpoint for live reload.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream;

use crate::RELOAD_EVENT;
use crate::state::AppState;

/// Stream a `reload` message to the client after every successful rebuild.
///
/// The subscription lives inside the stream, so it leaves the registry
/// when axum drops the stream on disconnect.
pub(crate) async fn sse_handler(State(state): State<Arc<AppState>>) -> Response {
    let Some(registry) = &state.registry else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let subscription = registry.subscribe();
    let events = stream::unfold(subscription, |mut subscription| async move {
        subscription
            .recv()
            .await
            .map(|()| (Ok::<_, Infallible>(Event::default().data(RELOAD_EVENT)), subscription))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}
