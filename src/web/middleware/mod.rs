//! # Web API Middleware
//!
//! Middleware stack for the web API: bearer-token auth for admin routes
//! and request-id tagging for log correlation.

pub mod auth;
pub mod request_id;
