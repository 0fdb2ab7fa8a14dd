//! # Authentication Module
//!
//! Authentication itself happens upstream: a proxy verifies the session and
//! forwards the user's opaque id in a trusted header. This module turns that
//! header into an [`AuthenticatedUser`] and applies the "can book / cannot
//! book" distinction.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderName},
};
use eyre::{eyre, Result};
use washclub_core::errors::BookingError;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Header carrying the authenticated user id
    pub user_header: HeaderName,
    /// Users that may browse the calendar but not book
    pub view_only_users: HashSet<String>,
}

impl AuthSettings {
    pub fn new(user_header: &str, view_only_users: HashSet<String>) -> Result<Self> {
        let user_header = HeaderName::from_bytes(user_header.as_bytes())
            .map_err(|e| eyre!("Invalid auth header name {:?}: {}", user_header, e))?;
        Ok(Self {
            user_header,
            view_only_users,
        })
    }
}

/// The caller's identity as established by the upstream authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub can_book: bool,
}

impl AuthenticatedUser {
    /// Rejects users with the view-only role.
    pub fn require_booker(&self) -> Result<(), BookingError> {
        if self.can_book {
            Ok(())
        } else {
            Err(BookingError::Authorization(format!(
                "User {} may view the calendar but not book",
                self.user_id
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let missing = || AppError(BookingError::Authentication("Missing user identity".to_string()));

        let user_id = parts
            .headers
            .get(&state.auth.user_header)
            .ok_or_else(missing)?
            .to_str()
            .map_err(|_| AppError(BookingError::Authentication("Malformed user identity".to_string())))?
            .trim();

        if user_id.is_empty() {
            return Err(missing());
        }

        Ok(Self {
            user_id: user_id.to_string(),
            can_book: !state.auth.view_only_users.contains(user_id),
        })
    }
}
