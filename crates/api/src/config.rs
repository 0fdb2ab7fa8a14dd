//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Wash Club API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `STORE_BACKEND`: `postgres` or `memory` (default: "postgres")
//! - `DATABASE_URL`: PostgreSQL connection string (required for the postgres backend)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `CLUB_TIMEZONE`: IANA zone used to decide what "today" is (default: "UTC")
//! - `BOOKING_WINDOW_DAYS`: Width of the rolling window (default: 21)
//! - `BOOKING_WINDOW_MODE`: `symmetric` or `trailing` (default: "symmetric")
//! - `AUTH_USER_HEADER`: Header carrying the authenticated user id (default: "x-user-id")
//! - `VIEW_ONLY_USERS`: Comma-separated user ids that may browse but not book

use std::collections::HashSet;
use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use tracing::Level;
use washclub_core::eligibility::{RollingWindow, WindowDirection, CLUB_WINDOW_DAYS};

/// Which booking store implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(eyre!("Unknown STORE_BACKEND value: {}", other)),
        }
    }
}

/// Configuration for the Wash Club API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// Booking store selected at startup
    pub store_backend: StoreBackend,

    /// PostgreSQL database connection string
    pub database_url: Option<String>,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Zone in which booking dates are interpreted
    pub timezone: Tz,

    /// Rolling-window rule applied to every booking
    pub window: RollingWindow,

    /// Header set by the authenticating proxy
    pub user_header: String,

    /// Users with the "cannot book" role
    pub view_only_users: HashSet<String>,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `STORE_BACKEND` is postgres and `DATABASE_URL` is not set
    /// - `API_PORT` or `BOOKING_WINDOW_DAYS` cannot be parsed
    /// - `CLUB_TIMEZONE`, `STORE_BACKEND` or `BOOKING_WINDOW_MODE` is unknown
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Storage settings
        let store_backend: StoreBackend = var("STORE_BACKEND", "postgres").parse()?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(eyre!("DATABASE_URL environment variable must be set"));
        }

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| split_list(&origins));

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30").parse().unwrap_or(30);

        // Booking rules
        let timezone: Tz = var("CLUB_TIMEZONE", "UTC")
            .parse()
            .map_err(|e| eyre!("Invalid CLUB_TIMEZONE value: {}", e))?;
        let days = var("BOOKING_WINDOW_DAYS", &CLUB_WINDOW_DAYS.to_string())
            .parse()
            .wrap_err("Invalid BOOKING_WINDOW_DAYS value")?;
        let direction: WindowDirection = var("BOOKING_WINDOW_MODE", "symmetric")
            .parse()
            .map_err(|e| eyre!("Invalid BOOKING_WINDOW_MODE value: {}", e))?;

        // Identity settings
        let user_header = var("AUTH_USER_HEADER", "x-user-id").to_ascii_lowercase();
        let view_only_users = lookup("VIEW_ONLY_USERS")
            .map(|users| split_list(&users).into_iter().collect())
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            timezone,
            window: RollingWindow::new(days, direction),
            user_header,
            view_only_users,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
