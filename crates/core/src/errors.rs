use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a booking or cancellation was refused.
///
/// Denials are expected outcomes, not faults: the engine returns them as
/// values and callers must never retry them automatically.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    #[error("Bookings are only allowed on Fridays")]
    WrongWeekday,

    #[error("This date is in the past")]
    Past,

    #[error("This slot is already booked")]
    SlotTaken,

    #[error("Only one booking per 3-week period; eligible again from {eligible_after}")]
    WindowConflict { eligible_after: NaiveDate },

    #[error("Only the owner may cancel this booking")]
    NotOwner,
}

impl DenialReason {
    /// Stable snake_case code used in API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::WrongWeekday => "wrong_weekday",
            DenialReason::Past => "past",
            DenialReason::SlotTaken => "slot_taken",
            DenialReason::WindowConflict { .. } => "window_conflict",
            DenialReason::NotOwner => "not_owner",
        }
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking denied: {0}")]
    Denied(#[from] DenialReason),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Booking store error: {0}")]
    Store(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// Only storage faults are transient; re-running the whole request is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Store(_))
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            BookingError::Denied(reason) => Some(*reason),
            _ => None,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
