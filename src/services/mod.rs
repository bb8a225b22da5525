//! Business logic services.

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod booking;
pub mod business;
pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod filtering;
pub mod hours;
pub mod lifecycle;
pub mod professional;
pub mod scope;
pub mod stats;
