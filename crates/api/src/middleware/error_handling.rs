//! # Error Handling Middleware
//!
//! Maps [`BookingError`] values to HTTP status codes and JSON bodies so every
//! handler reports failures the same way. Booking denials carry their reason
//! code (and, for window conflicts, the date the user becomes eligible again)
//! so the calendar can explain the refusal.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use washclub_core::errors::{BookingError, DenialReason};

/// Application error wrapper that provides HTTP status code mapping
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::Denied(reason) => denial_status(reason),
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Authorization(_) => StatusCode::FORBIDDEN,
            BookingError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn denial_status(reason: &DenialReason) -> StatusCode {
    match reason {
        DenialReason::WrongWeekday | DenialReason::Past => StatusCode::UNPROCESSABLE_ENTITY,
        DenialReason::SlotTaken | DenialReason::WindowConflict { .. } => StatusCode::CONFLICT,
        DenialReason::NotOwner => StatusCode::FORBIDDEN,
    }
}

/// Converts application errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body = json!({ "error": self.0.to_string() });
        match &self.0 {
            BookingError::Denied(reason) => {
                body["reason"] = Value::from(reason.code());
                if let DenialReason::WindowConflict { eligible_after } = reason {
                    body["eligible_after"] = Value::from(eligible_after.to_string());
                }
            }
            BookingError::Store(report) => {
                tracing::error!("Booking store failure: {:?}", report);
                body["retryable"] = Value::from(true);
            }
            BookingError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Automatic conversion from BookingError to AppError
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Reports reaching a handler come from the storage layer.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Store(err))
    }
}

/// Malformed request input, e.g. an unknown slot label or a bad date
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(BookingError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(BookingError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(BookingError::Validation(rejection.body_text()))
    }
}

impl From<DenialReason> for AppError {
    fn from(reason: DenialReason) -> Self {
        AppError(BookingError::Denied(reason))
    }
}

/// Maps a BookingError to an HTTP response
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
