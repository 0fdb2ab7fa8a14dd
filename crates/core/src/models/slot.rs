use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::errors::BookingError;

/// The only weekday on which washing slots exist.
pub const BOOKING_WEEKDAY: Weekday = Weekday::Fri;

/// Fixed daily washing windows.
///
/// Deserialization goes through [`FromStr`], so an unknown label is reported
/// as a validation error naming the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeSlot {
    #[serde(rename = "08:00-10:00")]
    Morning,
    #[serde(rename = "10:00-12:00")]
    Midday,
    #[serde(rename = "14:00-16:00")]
    Afternoon,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Midday, TimeSlot::Afternoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "08:00-10:00",
            TimeSlot::Midday => "10:00-12:00",
            TimeSlot::Afternoon => "14:00-16:00",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s.trim())
            .ok_or_else(|| BookingError::Validation(format!("Unknown time slot: {s}")))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = BookingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
