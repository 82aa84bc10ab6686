//! Appointment Aggregate
//!
//! Case requests and slot bookings between clients and advocates.

pub mod entity;
pub mod repository;
