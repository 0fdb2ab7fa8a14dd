//! # Eligibility Engine
//!
//! Pure decision functions for the booking rules. Nothing here performs I/O or
//! reads the clock: callers pass `today` explicitly, so the same inputs always
//! yield the same decision.
//!
//! Checks run in a fixed order and the first failure decides the reason:
//!
//! 1. the date is a Friday
//! 2. the date is not before today
//! 3. nobody holds the `(date, slot)` pair
//! 4. the user has no booking inside the rolling window around the date

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, DenialReason};
use crate::models::booking::{Booking, BookingCandidate};
use crate::models::slot::BOOKING_WEEKDAY;

/// Width of the club's rolling window, in days.
pub const CLUB_WINDOW_DAYS: u32 = 21;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum EligibilityDecision {
    Allowed,
    Denied {
        #[serde(flatten)]
        reason: DenialReason,
    },
}

impl EligibilityDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EligibilityDecision::Allowed)
    }

    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            EligibilityDecision::Allowed => None,
            EligibilityDecision::Denied { reason } => Some(*reason),
        }
    }

    pub fn into_result(self) -> Result<(), DenialReason> {
        match self {
            EligibilityDecision::Allowed => Ok(()),
            EligibilityDecision::Denied { reason } => Err(reason),
        }
    }
}

impl From<DenialReason> for EligibilityDecision {
    fn from(reason: DenialReason) -> Self {
        EligibilityDecision::Denied { reason }
    }
}

/// Which existing bookings the rolling window looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowDirection {
    /// Bookings before and after the candidate both block it.
    Symmetric,
    /// Only bookings on or before the candidate date block it.
    TrailingOnly,
}

impl WindowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowDirection::Symmetric => "symmetric",
            WindowDirection::TrailingOnly => "trailing",
        }
    }
}

impl fmt::Display for WindowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowDirection {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symmetric" => Ok(WindowDirection::Symmetric),
            "trailing" | "trailing_only" => Ok(WindowDirection::TrailingOnly),
            other => Err(BookingError::Validation(format!(
                "Unknown window direction: {other}"
            ))),
        }
    }
}

/// The "one booking per rolling window" rule.
///
/// Bounds are inclusive: with the club default a booking on `D` blocks every
/// date in `[D - 21, D + 21]`, and `D + 22` is the first free date after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollingWindow {
    pub days: u32,
    pub direction: WindowDirection,
}

impl RollingWindow {
    pub const fn club_rule() -> Self {
        Self {
            days: CLUB_WINDOW_DAYS,
            direction: WindowDirection::Symmetric,
        }
    }

    pub const fn new(days: u32, direction: WindowDirection) -> Self {
        Self { days, direction }
    }

    /// Whether an existing booking on `existing` blocks a booking on `candidate`.
    pub fn blocks(&self, existing: NaiveDate, candidate: NaiveDate) -> bool {
        let distance = candidate.signed_duration_since(existing).num_days();
        match self.direction {
            WindowDirection::Symmetric => distance.abs() <= i64::from(self.days),
            WindowDirection::TrailingOnly => (0..=i64::from(self.days)).contains(&distance),
        }
    }

    /// Inclusive range of dates whose bookings would block `candidate`.
    pub fn bounds(&self, candidate: NaiveDate) -> (NaiveDate, NaiveDate) {
        let span = Days::new(u64::from(self.days));
        let start = candidate.checked_sub_days(span).unwrap_or(NaiveDate::MIN);
        let end = match self.direction {
            WindowDirection::Symmetric => candidate.checked_add_days(span).unwrap_or(NaiveDate::MAX),
            WindowDirection::TrailingOnly => candidate,
        };
        (start, end)
    }

    /// First date on which a booking on `existing` stops blocking.
    pub fn reopens_on(&self, existing: NaiveDate) -> NaiveDate {
        existing
            .checked_add_days(Days::new(u64::from(self.days) + 1))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::club_rule()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityEngine {
    window: RollingWindow,
}

impl EligibilityEngine {
    pub fn new(window: RollingWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> RollingWindow {
        self.window
    }

    pub fn evaluate(
        &self,
        candidate: &BookingCandidate,
        existing: &[Booking],
        today: NaiveDate,
    ) -> EligibilityDecision {
        if candidate.date.weekday() != BOOKING_WEEKDAY {
            return DenialReason::WrongWeekday.into();
        }

        if candidate.date < today {
            return DenialReason::Past.into();
        }

        if existing
            .iter()
            .any(|b| b.date == candidate.date && b.slot == candidate.slot)
        {
            return DenialReason::SlotTaken.into();
        }

        match self.window_conflict(candidate, existing) {
            Some(reason) => reason.into(),
            None => EligibilityDecision::Allowed,
        }
    }

    /// The rolling-window check on its own.
    ///
    /// Reports the conflicting booking nearest to the candidate; on a tie the
    /// later booking wins since it reopens last.
    pub fn window_conflict(
        &self,
        candidate: &BookingCandidate,
        existing: &[Booking],
    ) -> Option<DenialReason> {
        existing
            .iter()
            .filter(|b| b.user_id == candidate.user_id)
            .filter(|b| self.window.blocks(b.date, candidate.date))
            .min_by_key(|b| {
                let distance = candidate.date.signed_duration_since(b.date).num_days().abs();
                (distance, std::cmp::Reverse(b.date))
            })
            .map(|nearest| DenialReason::WindowConflict {
                eligible_after: self.window.reopens_on(nearest.date),
            })
    }

    pub fn can_cancel(
        &self,
        booking: &Booking,
        requesting_user_id: &str,
        today: NaiveDate,
    ) -> EligibilityDecision {
        if booking.user_id != requesting_user_id {
            return DenialReason::NotOwner.into();
        }
        if booking.date < today {
            return DenialReason::Past.into();
        }
        EligibilityDecision::Allowed
    }
}

/// Evaluates a candidate against the club's default rules.
pub fn evaluate(
    candidate: &BookingCandidate,
    existing: &[Booking],
    today: NaiveDate,
) -> EligibilityDecision {
    EligibilityEngine::default().evaluate(candidate, existing, today)
}

pub fn can_cancel(booking: &Booking, requesting_user_id: &str, today: NaiveDate) -> EligibilityDecision {
    EligibilityEngine::default().can_cancel(booking, requesting_user_id, today)
}
