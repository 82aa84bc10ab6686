//! Search Aggregate
//!
//! Free-text search across advocates and internships.

pub mod api;

pub use api::{search_router, SearchState};
