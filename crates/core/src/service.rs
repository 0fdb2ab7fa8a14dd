//! # Booking Orchestrator
//!
//! Sequences the reads, the eligibility decision and the store mutation for
//! booking and cancellation requests. The engine decides on a snapshot; the
//! store re-verifies at commit time and any conflict it finds is reported
//! with the same [`DenialReason`] vocabulary as the up-front checks.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::eligibility::{EligibilityDecision, EligibilityEngine, RollingWindow};
use crate::errors::{BookingError, BookingResult, DenialReason};
use crate::models::booking::{Booking, BookingCandidate, BookingEvent};
use crate::models::slot::TimeSlot;
use crate::store::{BookingStore, DeleteOutcome, InsertOutcome};

/// Longest range `calendar` will serve in one call.
pub const MAX_CALENDAR_DAYS: i64 = 366;

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    engine: EligibilityEngine,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, window: RollingWindow) -> Self {
        Self {
            store,
            clock,
            engine: EligibilityEngine::new(window),
        }
    }

    pub fn engine(&self) -> EligibilityEngine {
        self.engine
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn request_booking(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> BookingResult<Booking> {
        let candidate = candidate(user_id, date, slot)?;

        if let Some(reason) = self.decide(&candidate).await?.reason() {
            info!(user_id, %date, %slot, reason = reason.code(), "Booking denied");
            return Err(reason.into());
        }

        match self.store.insert_if_free(&candidate, self.engine.window()).await? {
            InsertOutcome::Inserted(booking) => {
                info!(id = %booking.id, user_id, %date, %slot, "Booking created");
                Ok(booking)
            }
            InsertOutcome::SlotTaken => {
                warn!(user_id, %date, %slot, "Slot taken between check and commit");
                Err(DenialReason::SlotTaken.into())
            }
            InsertOutcome::WindowConflict(own) => {
                warn!(user_id, %date, conflicts = own.len(), "Window conflict at commit");
                let reason = self.engine.window_conflict(&candidate, &own).ok_or_else(|| {
                    eyre::eyre!("store reported a window conflict outside the configured window")
                })?;
                Err(reason.into())
            }
        }
    }

    pub async fn request_cancellation(
        &self,
        booking_id: Uuid,
        requesting_user_id: &str,
    ) -> BookingResult<()> {
        let booking = self
            .store
            .get(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {booking_id} not found")))?;

        self.engine
            .can_cancel(&booking, requesting_user_id, self.clock.today())
            .into_result()
            .inspect_err(|reason| {
                info!(%booking_id, requesting_user_id, reason = reason.code(), "Cancellation denied");
            })?;

        match self.store.delete(booking_id).await? {
            DeleteOutcome::Deleted => {
                info!(%booking_id, requesting_user_id, date = %booking.date, "Booking cancelled");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(BookingError::NotFound(format!(
                "Booking with ID {booking_id} not found"
            ))),
        }
    }

    /// Decision preview without committing anything.
    pub async fn check_eligibility(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> BookingResult<EligibilityDecision> {
        let candidate = candidate(user_id, date, slot)?;
        self.decide(&candidate).await
    }

    pub async fn bookings_for_user(&self, user_id: &str, upcoming_only: bool) -> BookingResult<Vec<Booking>> {
        let mut bookings = self.store.list_by_user(user_id).await?;
        if upcoming_only {
            let today = self.clock.today();
            bookings.retain(|b| b.date >= today);
        }
        bookings.sort_by_key(|b| (b.date, b.slot));
        Ok(bookings)
    }

    pub async fn bookings_for_date(&self, date: NaiveDate) -> BookingResult<Vec<Booking>> {
        let mut bookings = self.store.list_by_date(date).await?;
        bookings.sort_by_key(|b| b.slot);
        Ok(bookings)
    }

    pub async fn calendar(&self, from: NaiveDate, to: NaiveDate) -> BookingResult<Vec<Booking>> {
        if from > to {
            return Err(BookingError::Validation(format!(
                "Range start {from} is after range end {to}"
            )));
        }
        if to.signed_duration_since(from).num_days() > MAX_CALENDAR_DAYS {
            return Err(BookingError::Validation(format!(
                "Range may not exceed {MAX_CALENDAR_DAYS} days"
            )));
        }
        debug!(%from, %to, "Loading calendar");
        Ok(self.store.list_between(from, to).await?)
    }

    /// Default calendar range: today through eight weeks ahead.
    pub fn default_calendar_range(&self) -> (NaiveDate, NaiveDate) {
        let today = self.clock.today();
        (today, today.checked_add_days(Days::new(56)).unwrap_or(today))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.store.subscribe()
    }

    async fn decide(&self, candidate: &BookingCandidate) -> BookingResult<EligibilityDecision> {
        // Same-date rows feed the slot check, the user's rows feed the window check.
        let mut relevant: BTreeMap<Uuid, Booking> = BTreeMap::new();
        for booking in self.store.list_by_date(candidate.date).await? {
            relevant.insert(booking.id, booking);
        }
        for booking in self.store.list_by_user(&candidate.user_id).await? {
            relevant.insert(booking.id, booking);
        }
        let existing: Vec<Booking> = relevant.into_values().collect();

        let decision = self.engine.evaluate(candidate, &existing, self.clock.today());
        debug!(
            user_id = %candidate.user_id,
            date = %candidate.date,
            slot = %candidate.slot,
            considered = existing.len(),
            ?decision,
            "Evaluated booking candidate"
        );
        Ok(decision)
    }
}

fn candidate(user_id: &str, date: NaiveDate, slot: TimeSlot) -> BookingResult<BookingCandidate> {
    if user_id.trim().is_empty() {
        return Err(BookingError::Validation("User id must not be empty".to_string()));
    }
    Ok(BookingCandidate::new(user_id, date, slot))
}
