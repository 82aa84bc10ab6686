//! Messaging Aggregate
//!
//! Direct and group conversations with unread counters and read receipts.

pub mod api;
pub mod entity;
pub mod repository;
