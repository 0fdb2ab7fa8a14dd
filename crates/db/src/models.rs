use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use washclub_core::models::{booking::Booking, slot::TimeSlot};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub user_id: String,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbBooking> for Booking {
    type Error = eyre::Report;

    fn try_from(row: DbBooking) -> Result<Self> {
        let slot: TimeSlot = row
            .time_slot
            .parse()
            .map_err(|_| eyre!("Booking {} has unknown time slot {:?}", row.id, row.time_slot))?;

        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            date: row.booking_date,
            slot,
            created_at: row.created_at,
        })
    }
}

pub fn into_bookings(rows: Vec<DbBooking>) -> Result<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}
