//! Row counts reported by `GET /api/stats`.

use serde::Serialize;

/// How many rows each table holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub users: i64,
    pub products: i64,
    pub conversations: i64,
    pub messages: i64,
}
