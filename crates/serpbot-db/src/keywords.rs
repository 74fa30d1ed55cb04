//! Database operations for the `keywords` table.

use chrono::{DateTime, Utc};
use serpbot_core::Keyword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `keywords` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: Uuid,
    pub website_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        Keyword {
            id: row.id,
            website_id: row.website_id,
            name: row.name,
        }
    }
}

/// Returns the keywords of a website in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keywords_by_website(
    pool: &PgPool,
    website_id: Uuid,
) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, website_id, name, created_at \
         FROM keywords \
         WHERE website_id = $1 \
         ORDER BY seq",
    )
    .bind(website_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
