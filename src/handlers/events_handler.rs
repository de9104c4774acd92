use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use metrics::gauge;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{extractors::AuthenticatedUser, AppState};

/// Decrements the subscriber gauge when the client disconnects and the
/// stream is dropped.
struct FeedGuard {
    profile_id: i32,
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        gauge!("change_feed_subscribers").decrement(1.0);
        tracing::debug!(profile_id = self.profile_id, "Change feed unsubscribed");
    }
}

/// GET /api/events - The caller's live change feed as Server-Sent Events
///
/// The connection is the subscription scope: dropping it releases the
/// broadcast receiver.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "SSE stream of change events for the caller")
    ),
    tag = "events",
    security(("cookie_auth" = []))
)]
pub async fn event_stream(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let profile_id = auth.profile_id;
    let rx = state.events.subscribe();

    gauge!("change_feed_subscribers").increment(1.0);
    let guard = FeedGuard { profile_id };
    tracing::debug!(profile_id, "Change feed subscribed");

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        // Ties the guard's lifetime to the stream's.
        let _ = &guard;
        // Lagged receivers just skip what they missed; the database is
        // the source of truth and the client re-fetches on each event.
        let event = result.ok()?;
        if !event.is_for(profile_id) {
            return None;
        }

        let data = serde_json::json!({
            "kind": event.kind.as_str(),
            "payload": event.payload,
        });

        Some(Ok(Event::default()
            .event(event.kind.as_str())
            .data(data.to_string())))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
