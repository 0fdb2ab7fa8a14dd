//! # Wash Club API
//!
//! The API crate provides the web server for the Friday washing-slot
//! reservations. It exposes the calendar, eligibility previews, booking and
//! cancellation endpoints, and a server-sent-events feed of booking changes.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into [`BookingService`] calls
//! - **Middleware**: Identity extraction and error mapping
//! - **Config**: Environment and application configuration
//!
//! The booking store behind the service is chosen once at startup
//! (see [`config::StoreBackend`]).

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for identity and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError, Router};
use eyre::Result;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use washclub_core::{
    clock::SystemClock,
    service::BookingService,
    store::BookingStore,
};
use washclub_db::{create_pool, schema::initialize_database, InMemoryBookingStore, PgBookingStore};

use crate::config::{ApiConfig, StoreBackend};
use crate::middleware::auth::AuthSettings;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Booking orchestrator over the configured store
    pub bookings: BookingService,
    /// Identity header and view-only roster
    pub auth: AuthSettings,
}

/// Installs the global tracing subscriber at the given level.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the application state, connecting the configured booking store.
pub async fn build_state(config: &ApiConfig) -> Result<Arc<ApiState>> {
    let store: Arc<dyn BookingStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| eyre::eyre!("DATABASE_URL environment variable must be set"))?;
            let pool = create_pool(database_url).await?;
            initialize_database(&pool).await?;
            info!("Using PostgreSQL booking store");
            Arc::new(PgBookingStore::connect(pool).await?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory booking store; bookings will not survive a restart");
            Arc::new(InMemoryBookingStore::new())
        }
    };

    let clock = Arc::new(SystemClock::new(config.timezone));
    let bookings = BookingService::new(store, clock, config.window);
    let auth = AuthSettings::new(&config.user_header, config.view_only_users.clone())?;

    Ok(Arc::new(ApiState { bookings, auth }))
}

/// Builds the router with every endpoint attached to `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Calendar and booking endpoints
        .merge(routes::bookings::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and state
pub async fn start_server(config: ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<axum::http::HeaderValue>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower::ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async {
                    StatusCode::REQUEST_TIMEOUT
                }))
                .timeout(Duration::from_secs(config.request_timeout)),
        );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
