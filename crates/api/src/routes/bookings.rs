use axum::{
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/slots", get(handlers::rules::slot_grid))
        .route(
            "/api/bookings",
            get(handlers::bookings::list_calendar).post(handlers::bookings::create_booking),
        )
        .route("/api/bookings/events", get(handlers::events::booking_events))
        .route(
            "/api/bookings/date/:date",
            get(handlers::bookings::bookings_on_date),
        )
        .route("/api/bookings/:id", delete(handlers::bookings::cancel_booking))
        .route("/api/me/bookings", get(handlers::bookings::my_bookings))
        .route("/api/eligibility", get(handlers::bookings::check_eligibility))
}
