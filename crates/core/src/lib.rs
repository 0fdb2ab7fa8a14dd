//! # Wash Club Core
//!
//! Domain types and rules for the Friday washing-slot reservations: the
//! booking model, the eligibility engine, the store abstraction and the
//! orchestrating [`service::BookingService`].

pub mod clock;
pub mod eligibility;
pub mod errors;
pub mod models;
pub mod service;
pub mod store;
