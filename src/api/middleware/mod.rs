//! HTTP middleware for request processing and protection.
//!
//! Provides bearer-token authentication and request tracing.

pub mod auth;
pub mod tracing;
