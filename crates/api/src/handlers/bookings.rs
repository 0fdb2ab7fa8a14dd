use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;
use washclub_core::{
    eligibility::EligibilityDecision,
    models::booking::{Booking, CalendarQuery, CreateBookingRequest, EligibilityQuery, MyBookingsQuery},
};

use crate::{
    middleware::{
        auth::AuthenticatedUser,
        error_handling::AppError,
        validation::{ValidJson, ValidPath, ValidQuery},
    },
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_calendar(
    State(state): State<Arc<ApiState>>,
    _user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<CalendarQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let (default_from, default_to) = state.bookings.default_calendar_range();
    let from = query.from.unwrap_or(default_from);
    let to = query.to.unwrap_or(if from > default_to { from } else { default_to });

    let bookings = state.bookings.calendar(from, to).await?;
    Ok(Json(bookings))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn bookings_on_date(
    State(state): State<Arc<ApiState>>,
    _user: AuthenticatedUser,
    ValidPath(date): ValidPath<NaiveDate>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.bookings_for_date(date).await?;
    Ok(Json(bookings))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn my_bookings(
    State(state): State<Arc<ApiState>>,
    user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<MyBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state
        .bookings
        .bookings_for_user(&user.user_id, query.upcoming)
        .await?;
    Ok(Json(bookings))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn check_eligibility(
    State(state): State<Arc<ApiState>>,
    user: AuthenticatedUser,
    ValidQuery(query): ValidQuery<EligibilityQuery>,
) -> Result<Json<EligibilityDecision>, AppError> {
    let decision = state
        .bookings
        .check_eligibility(&user.user_id, query.date, query.slot)
        .await?;
    Ok(Json(decision))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    user: AuthenticatedUser,
    ValidJson(payload): ValidJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    user.require_booker()?;

    let booking = state
        .bookings
        .request_booking(&user.user_id, payload.date, payload.slot)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    user: AuthenticatedUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.bookings.request_cancellation(id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
