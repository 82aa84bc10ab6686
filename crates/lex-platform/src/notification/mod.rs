//! Notification Aggregate
//!
//! Per-user inboxes fed by domain side effects, with polymorphic
//! references back to the originating entity.

pub mod api;
pub mod entity;
pub mod repository;
