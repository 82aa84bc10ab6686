//! User Aggregate
//!
//! Accounts for every role, with the role payload embedded in the document.

pub mod entity;
pub mod repository;
