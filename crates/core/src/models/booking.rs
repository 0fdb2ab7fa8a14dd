use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::TimeSlot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub created_at: DateTime<Utc>,
}

/// A `(user, date, slot)` triple under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCandidate {
    pub user_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

impl BookingCandidate {
    pub fn new(user_id: impl Into<String>, date: NaiveDate, slot: TimeSlot) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            slot,
        }
    }
}

/// Change notification published by booking stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingEvent {
    Created {
        id: Uuid,
        user_id: String,
        date: NaiveDate,
        slot: TimeSlot,
    },
    Cancelled {
        id: Uuid,
        user_id: String,
        date: NaiveDate,
        slot: TimeSlot,
    },
}

impl BookingEvent {
    pub fn created(booking: &Booking) -> Self {
        BookingEvent::Created {
            id: booking.id,
            user_id: booking.user_id.clone(),
            date: booking.date,
            slot: booking.slot,
        }
    }

    pub fn cancelled(booking: &Booking) -> Self {
        BookingEvent::Cancelled {
            id: booking.id,
            user_id: booking.user_id.clone(),
            date: booking.date,
            slot: booking.slot,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BookingEvent::Created { .. } => "created",
            BookingEvent::Cancelled { .. } => "cancelled",
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            BookingEvent::Created { date, .. } | BookingEvent::Cancelled { date, .. } => *date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyBookingsQuery {
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityQuery {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGridResponse {
    pub weekday: String,
    pub slots: Vec<TimeSlot>,
    pub window_days: u32,
    pub window_direction: String,
}
