//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They receive the store explicitly and own validation and units of work.

pub mod account_service;
pub mod transfer_service;
pub mod user_service;
