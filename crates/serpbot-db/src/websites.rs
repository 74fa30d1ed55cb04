//! Database operations for the `websites` table.

use chrono::{DateTime, Utc};
use serpbot_core::Website;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `websites` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebsiteRow {
    pub id: Uuid,
    pub domain: String,
    /// Owning client's username.
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<WebsiteRow> for Website {
    fn from(row: WebsiteRow) -> Self {
        Website {
            id: row.id,
            domain: row.domain,
            owner: row.username,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a website by id regardless of owner, or `None` if it does not exist.
///
/// Ownership is checked by the caller.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_website_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WebsiteRow>, DbError> {
    let row = sqlx::query_as::<_, WebsiteRow>(
        "SELECT id, domain, username, created_at \
         FROM websites \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every website owned by `username`, ordered by domain.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_websites_by_owner(
    pool: &PgPool,
    username: &str,
) -> Result<Vec<WebsiteRow>, DbError> {
    let rows = sqlx::query_as::<_, WebsiteRow>(
        "SELECT id, domain, username, created_at \
         FROM websites \
         WHERE username = $1 \
         ORDER BY domain",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
