use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use washclub_core::eligibility::RollingWindow;
use washclub_core::models::booking::{Booking, BookingCandidate, BookingEvent};
use washclub_core::store::{BookingStore, DeleteOutcome, EVENT_CHANNEL_CAPACITY, InsertOutcome};

use crate::models::into_bookings;
use crate::repositories::booking::{self as repo, DbInsert};
use crate::schema::BOOKING_CHANNEL;
use crate::DbPool;

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// PostgreSQL-backed booking store.
///
/// Change events come from the `bookings_notify` trigger, so every process
/// connected to the same database observes every booking change. The
/// forwarding task lives as long as the store and is aborted when it drops.
pub struct PgBookingStore {
    pool: DbPool,
    events: broadcast::Sender<BookingEvent>,
    listener_task: JoinHandle<()>,
}

impl PgBookingStore {
    /// Creates the store and starts forwarding database notifications.
    pub async fn connect(pool: DbPool) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(BOOKING_CHANNEL).await?;
        let listener_task = tokio::spawn(forward_notifications(listener, events.clone()));
        info!("Listening for booking changes on channel {}", BOOKING_CHANNEL);

        Ok(Self {
            pool,
            events,
            listener_task,
        })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Whether database notifications are still being forwarded.
    pub fn is_listening(&self) -> bool {
        !self.listener_task.is_finished()
    }
}

impl Drop for PgBookingStore {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}

async fn forward_notifications(mut listener: PgListener, events: broadcast::Sender<BookingEvent>) {
    loop {
        match listener.recv().await {
            Ok(notification) => match serde_json::from_str::<BookingEvent>(notification.payload()) {
                Ok(event) => {
                    debug!("Booking change: {} on {}", event.kind(), event.date());
                    // No subscribers is fine.
                    let _ = events.send(event);
                }
                Err(e) => warn!("Ignoring malformed booking notification: {}", e),
            },
            Err(sqlx::Error::PoolClosed) => {
                info!("Booking notification listener stopped: pool closed");
                break;
            }
            Err(e) => {
                // PgListener reconnects on the next recv; notifications sent
                // while disconnected are lost, so clients should refetch.
                error!("Booking notification listener error: {}", e);
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
            }
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        into_bookings(repo::list_bookings_by_user(&self.pool, user_id).await?)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>> {
        into_bookings(repo::list_bookings_by_date(&self.pool, date).await?)
    }

    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>> {
        into_bookings(repo::list_bookings_between(&self.pool, from, to).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>> {
        repo::get_booking_by_id(&self.pool, id)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn insert_if_free(
        &self,
        candidate: &BookingCandidate,
        window: RollingWindow,
    ) -> Result<InsertOutcome> {
        let (window_start, window_end) = window.bounds(candidate.date);

        let outcome = repo::insert_booking_if_free(
            &self.pool,
            &candidate.user_id,
            candidate.date,
            candidate.slot.as_str(),
            window_start,
            window_end,
        )
        .await?;

        Ok(match outcome {
            DbInsert::Inserted(row) => InsertOutcome::Inserted(Booking::try_from(row)?),
            DbInsert::SlotTaken => InsertOutcome::SlotTaken,
            DbInsert::WindowConflict(rows) => InsertOutcome::WindowConflict(into_bookings(rows)?),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<DeleteOutcome> {
        if repo::delete_booking(&self.pool, id).await? {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }
}
