use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{middleware::auth::AuthenticatedUser, ApiState};

/// Streams booking changes as server-sent events.
///
/// Each event is named after its kind (`created` / `cancelled`). A `resync`
/// event tells the client it fell behind and must refetch the calendar.
pub async fn booking_events(
    State(state): State<Arc<ApiState>>,
    user: AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("User {} subscribed to booking changes", user.user_id);

    let receiver = state.bookings.subscribe();
    let events = stream::unfold(receiver, |mut receiver| async move {
        let next = match receiver.recv().await {
            Ok(change) => Event::default().event(change.kind()).json_data(&change),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Booking event subscriber lagged by {} events", skipped);
                Ok(Event::default().event("resync").data(skipped.to_string()))
            }
            Err(RecvError::Closed) => return None,
        };
        Some((next, receiver))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
