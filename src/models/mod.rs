//! Data models representing database entities and API payloads.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response bodies built from them.

/// Bank account model
pub mod account;
/// Balance history entries
pub mod history;
/// Transfer requests, amount parsing and outcomes
pub mod transfer;
/// User model and bearer tokens
pub mod user;
