use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;
use washclub_core::eligibility::RollingWindow;
use washclub_core::models::booking::{Booking, BookingCandidate, BookingEvent};
use washclub_core::store::{BookingStore, DeleteOutcome, EVENT_CHANNEL_CAPACITY, InsertOutcome};

/// Process-local booking store.
///
/// The write lock is held across the slot check, the window check and the
/// insert, which gives the same guarantees as the database constraint.
pub struct InMemoryBookingStore {
    bookings: RwLock<BTreeMap<Uuid, Booking>>,
    events: broadcast::Sender<BookingEvent>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            bookings: RwLock::new(BTreeMap::new()),
            events,
        }
    }

    /// Seeds bookings without any checks; for fixtures and demos.
    pub async fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.bookings.write().await;
            for booking in bookings {
                guard.insert(booking.id, booking);
            }
        }
        store
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }

    async fn collect<F>(&self, filter: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let guard = self.bookings.read().await;
        let mut found: Vec<Booking> = guard.values().filter(|b| filter(*b)).cloned().collect();
        found.sort_by_key(|b| (b.date, b.slot));
        found
    }
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(self.collect(|b| b.user_id == user_id).await)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>> {
        Ok(self.collect(|b| b.date == date).await)
    }

    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>> {
        Ok(self.collect(|b| from <= b.date && b.date <= to).await)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn insert_if_free(
        &self,
        candidate: &BookingCandidate,
        window: RollingWindow,
    ) -> Result<InsertOutcome> {
        let (window_start, window_end) = window.bounds(candidate.date);
        let mut guard = self.bookings.write().await;

        if guard
            .values()
            .any(|b| b.date == candidate.date && b.slot == candidate.slot)
        {
            return Ok(InsertOutcome::SlotTaken);
        }

        let own: Vec<Booking> = guard
            .values()
            .filter(|b| b.user_id == candidate.user_id)
            .filter(|b| window_start <= b.date && b.date <= window_end)
            .cloned()
            .collect();
        if !own.is_empty() {
            return Ok(InsertOutcome::WindowConflict(own));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: candidate.user_id.clone(),
            date: candidate.date,
            slot: candidate.slot,
            created_at: Utc::now(),
        };
        guard.insert(booking.id, booking.clone());
        drop(guard);

        let _ = self.events.send(BookingEvent::created(&booking));
        Ok(InsertOutcome::Inserted(booking))
    }

    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        let removed = self.bookings.write().await.remove(&id);
        match removed {
            Some(booking) => {
                let _ = self.events.send(BookingEvent::cancelled(&booking));
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }
}
