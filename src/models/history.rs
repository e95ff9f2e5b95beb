//! Balance history entries.
//!
//! One entry is written per side of every successful transfer. Entries are
//! never updated; they go away only when their account is deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a `balance_history` row.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "770e8400-e29b-41d4-a716-446655440002",
///   "bank_account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "performed_at": "2025-12-21T16:00:00Z",
///   "description": "Withdrawn 12.50 for arishabarron#660e8400-e29b-41d4-a716-446655440001"
/// }
/// ```
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Insertion sequence; history is listed in this order.
    #[serde(skip)]
    pub seq: i64,
    pub bank_account_id: Uuid,
    pub performed_at: DateTime<Utc>,
    pub description: String,
}
