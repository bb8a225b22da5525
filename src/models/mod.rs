//! Store row types and request DTOs for all domain entities.

pub mod admin;
pub mod appointment;
pub mod business;
pub mod client;
pub mod hhmm;
pub mod hours;
pub mod professional;
pub mod service;
