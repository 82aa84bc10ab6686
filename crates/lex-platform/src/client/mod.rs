//! Client Aggregate
//!
//! Client-facing operations: case requests, slot booking, and the
//! client dashboard.

pub mod api;

pub use api::{clients_router, ClientsState};
