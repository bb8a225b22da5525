//! Request extractors for the caller's identity and tenant.

pub mod auth;
pub mod rbac;
