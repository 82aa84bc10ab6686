//! Admin Aggregate
//!
//! Moderation, verification, and platform analytics.

pub mod api;

pub use api::{admin_router, AdminState};
