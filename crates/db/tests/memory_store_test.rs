use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;
use washclub_core::{
    eligibility::{RollingWindow, WindowDirection},
    models::{
        booking::{Booking, BookingCandidate, BookingEvent},
        slot::TimeSlot,
    },
    store::{BookingStore, DeleteOutcome, InsertOutcome},
};
use washclub_db::InMemoryBookingStore;

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

fn seeded(user_id: &str, day: &str, slot: TimeSlot) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        date: date(day),
        slot,
        created_at: Utc::now(),
    }
}

async fn insert(store: &InMemoryBookingStore, user_id: &str, day: &str, slot: TimeSlot) -> InsertOutcome {
    store
        .insert_if_free(
            &BookingCandidate::new(user_id, date(day), slot),
            RollingWindow::club_rule(),
        )
        .await
        .expect("memory store does not fail")
}

#[tokio::test]
async fn test_insert_and_read_back() {
    let store = InMemoryBookingStore::new();

    let booking = match insert(&store, "u1", "2025-07-11", TimeSlot::Morning).await {
        InsertOutcome::Inserted(booking) => booking,
        other => panic!("expected insert, got {:?}", other),
    };

    assert_eq!(store.len().await, 1);
    assert_eq!(store.get(booking.id).await.unwrap(), Some(booking.clone()));
    assert_eq!(store.list_by_user("u1").await.unwrap(), vec![booking.clone()]);
    assert_eq!(
        store.list_by_date(date("2025-07-11")).await.unwrap(),
        vec![booking.clone()]
    );
    assert!(store.list_by_user("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_rejects_taken_slot() {
    let store = InMemoryBookingStore::new();
    insert(&store, "u1", "2025-07-11", TimeSlot::Morning).await;

    let outcome = insert(&store, "u2", "2025-07-11", TimeSlot::Morning).await;

    assert_eq!(outcome, InsertOutcome::SlotTaken);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_insert_reports_window_conflicts() {
    let existing = seeded("u1", "2025-07-11", TimeSlot::Morning);
    let store = InMemoryBookingStore::with_bookings([existing.clone()]).await;

    let outcome = insert(&store, "u1", "2025-07-25", TimeSlot::Midday).await;

    assert_eq!(outcome, InsertOutcome::WindowConflict(vec![existing]));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_insert_respects_window_direction() {
    let later = seeded("u1", "2025-08-01", TimeSlot::Morning);
    let store = InMemoryBookingStore::with_bookings([later]).await;
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Morning);

    let outcome = store
        .insert_if_free(&candidate, RollingWindow::new(21, WindowDirection::TrailingOnly))
        .await
        .unwrap();

    assert!(matches!(outcome, InsertOutcome::Inserted(_)));
}

#[tokio::test]
async fn test_list_between_is_inclusive_and_ordered() {
    let store = InMemoryBookingStore::with_bookings([
        seeded("u3", "2025-07-25", TimeSlot::Morning),
        seeded("u2", "2025-07-11", TimeSlot::Afternoon),
        seeded("u1", "2025-07-11", TimeSlot::Morning),
        seeded("u4", "2025-08-01", TimeSlot::Morning),
    ])
    .await;

    let found = store
        .list_between(date("2025-07-11"), date("2025-07-25"))
        .await
        .unwrap();

    let users: Vec<&str> = found.iter().map(|b| b.user_id.as_str()).collect();
    assert_eq!(users, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn test_delete() {
    let booking = seeded("u1", "2025-07-11", TimeSlot::Morning);
    let store = InMemoryBookingStore::with_bookings([booking.clone()]).await;

    assert_eq!(store.delete(booking.id).await.unwrap(), DeleteOutcome::Deleted);
    assert_eq!(store.delete(booking.id).await.unwrap(), DeleteOutcome::NotFound);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_changes_are_published() {
    let store = InMemoryBookingStore::new();
    let mut events = store.subscribe();

    let booking = match insert(&store, "u1", "2025-07-11", TimeSlot::Morning).await {
        InsertOutcome::Inserted(booking) => booking,
        other => panic!("expected insert, got {:?}", other),
    };
    store.delete(booking.id).await.unwrap();

    assert_eq!(events.recv().await.unwrap(), BookingEvent::created(&booking));
    assert_eq!(events.recv().await.unwrap(), BookingEvent::cancelled(&booking));
}

#[tokio::test]
async fn test_refused_inserts_publish_nothing() {
    let store = InMemoryBookingStore::new();
    insert(&store, "u1", "2025-07-11", TimeSlot::Morning).await;
    let mut events = store.subscribe();

    insert(&store, "u2", "2025-07-11", TimeSlot::Morning).await;

    assert!(events.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_one_slot() {
    let store = Arc::new(InMemoryBookingStore::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let candidate =
                    BookingCandidate::new(format!("user-{i}"), date("2025-07-11"), TimeSlot::Morning);
                store
                    .insert_if_free(&candidate, RollingWindow::club_rule())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            InsertOutcome::Inserted(_) => inserted += 1,
            InsertOutcome::SlotTaken => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_inside_one_window() {
    let store = Arc::new(InMemoryBookingStore::new());
    let fridays = ["2025-07-11", "2025-07-18", "2025-07-25"];

    let handles: Vec<_> = fridays
        .into_iter()
        .map(|day| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let candidate = BookingCandidate::new("u1", date(day), TimeSlot::Midday);
                store
                    .insert_if_free(&candidate, RollingWindow::club_rule())
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            InsertOutcome::Inserted(_) => inserted += 1,
            InsertOutcome::WindowConflict(own) => assert_eq!(own.len(), 1),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(store.list_by_user("u1").await.unwrap().len(), 1);
}
