//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Checks the caller's permissions and calls into a service
//! 3. Returns HTTP response (JSON, status code)

/// Bank account endpoints
pub mod accounts;
pub mod health;
/// Transfers and balance history
pub mod transfers;
/// User endpoints
pub mod users;
