//! # Request Validation
//!
//! Wrappers around axum's `Json`, `Query` and `Path` extractors whose
//! rejections become [`BookingError::Validation`], so malformed input gets the
//! same 400 JSON body as every other validation failure instead of axum's
//! plain-text rejection.
//!
//! [`BookingError::Validation`]: washclub_core::errors::BookingError::Validation

use axum::extract::{FromRequest, FromRequestParts};

use crate::middleware::error_handling::AppError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ValidQuery<T>(pub T);

/// URL path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);
