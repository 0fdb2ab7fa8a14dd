use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use tokio::sync::broadcast;
use uuid::Uuid;
use washclub_core::eligibility::RollingWindow;
use washclub_core::models::booking::{Booking, BookingCandidate, BookingEvent};
use washclub_core::store::{BookingStore, DeleteOutcome, InsertOutcome};

// Mock booking store for testing
mock! {
    pub Store {}

    #[async_trait]
    impl BookingStore for Store {
        async fn list_by_user(&self, user_id: &str) -> eyre::Result<Vec<Booking>>;

        async fn list_by_date(&self, date: NaiveDate) -> eyre::Result<Vec<Booking>>;

        async fn list_between(
            &self,
            from: NaiveDate,
            to: NaiveDate,
        ) -> eyre::Result<Vec<Booking>>;

        async fn get(&self, id: Uuid) -> eyre::Result<Option<Booking>>;

        async fn insert_if_free(
            &self,
            candidate: &BookingCandidate,
            window: RollingWindow,
        ) -> eyre::Result<InsertOutcome>;

        async fn delete(&self, id: Uuid) -> eyre::Result<DeleteOutcome>;

        fn subscribe(&self) -> broadcast::Receiver<BookingEvent>;
    }
}
