//! Table counts for the stats endpoint.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::StoreStats;

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    users: i64,
    products: i64,
    conversations: i64,
    messages: i64,
}

impl From<StatsRow> for StoreStats {
    fn from(row: StatsRow) -> Self {
        Self {
            users: row.users,
            products: row.products,
            conversations: row.conversations,
            messages: row.messages,
        }
    }
}

/// Repository for aggregate counts.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count the rows in every table, in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self) -> Result<StoreStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM conversations) AS conversations,
                (SELECT COUNT(*) FROM messages) AS messages
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
