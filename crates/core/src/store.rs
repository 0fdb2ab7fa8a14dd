use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::eligibility::RollingWindow;
use crate::models::booking::{Booking, BookingCandidate, BookingEvent};

/// Capacity of the change-notification channels kept by store implementations.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Booking),
    /// Another booking already holds the `(date, slot)` pair.
    SlotTaken,
    /// The user's bookings that fall inside the window at commit time.
    WindowConflict(Vec<Booking>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Persistence collaborator for bookings.
///
/// `insert_if_free` is the only write path for new bookings and must be
/// atomic: the `(date, slot)` uniqueness and the user's rolling window are
/// both re-checked by the store itself, because the caller's earlier reads may
/// be stale by the time the insert runs.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>>;

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>>;

    /// Bookings with `from <= date <= to`, ordered by date then slot.
    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>>;

    async fn insert_if_free(
        &self,
        candidate: &BookingCandidate,
        window: RollingWindow,
    ) -> Result<InsertOutcome>;

    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome>;

    fn subscribe(&self) -> broadcast::Receiver<BookingEvent>;
}
