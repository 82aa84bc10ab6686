//! Internship Aggregate
//!
//! Positions posted by advocates, applications from interns, admin
//! moderation of the draft/published/closed lifecycle.

pub mod api;
pub mod entity;
pub mod repository;
