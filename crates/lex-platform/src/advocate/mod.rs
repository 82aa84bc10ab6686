//! Advocate Aggregate
//!
//! Public advocate directory and the advocate's own workspace.

pub mod api;

pub use api::{advocates_router, AdvocatesState};
