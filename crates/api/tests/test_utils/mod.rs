use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::NaiveDate;
use washclub_api::{middleware::auth::AuthSettings, router, ApiState};
use washclub_core::{clock::FixedClock, eligibility::RollingWindow, service::BookingService};
use washclub_db::InMemoryBookingStore;

pub const USER_HEADER: &str = "x-user-id";

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

/// The date every handler test runs on.
pub fn today() -> NaiveDate {
    date("2025-07-01")
}

pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<InMemoryBookingStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_view_only(&[])
    }

    pub fn with_view_only(view_only: &[&str]) -> Self {
        let store = Arc::new(InMemoryBookingStore::new());
        let state = build_state(store.clone(), view_only);
        let server = TestServer::new(router(state)).expect("test server starts");
        Self { server, store }
    }
}

// Build state over an in-memory store and a pinned clock
pub fn build_state(store: Arc<InMemoryBookingStore>, view_only: &[&str]) -> Arc<ApiState> {
    let bookings = BookingService::new(
        store,
        Arc::new(FixedClock::new(today())),
        RollingWindow::club_rule(),
    );
    let view_only_users: HashSet<String> = view_only.iter().map(|u| u.to_string()).collect();
    let auth = AuthSettings::new(USER_HEADER, view_only_users).expect("valid header name");

    Arc::new(ApiState { bookings, auth })
}

/// Attaches the trusted identity header to a request.
pub fn as_user(request: TestRequest, user_id: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static(USER_HEADER),
        HeaderValue::from_str(user_id).expect("valid header value"),
    )
}
