use axum::{extract::State, Json};
use std::sync::Arc;
use washclub_core::models::{
    booking::SlotGridResponse,
    slot::{TimeSlot, BOOKING_WEEKDAY},
};

use crate::ApiState;

/// The weekly grid and rolling-window policy the calendar renders.
pub async fn slot_grid(State(state): State<Arc<ApiState>>) -> Json<SlotGridResponse> {
    let window = state.bookings.engine().window();

    Json(SlotGridResponse {
        weekday: BOOKING_WEEKDAY.to_string(),
        slots: TimeSlot::ALL.to_vec(),
        window_days: window.days,
        window_direction: window.direction.to_string(),
    })
}
