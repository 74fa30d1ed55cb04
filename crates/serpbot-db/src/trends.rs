//! Read queries for the `trends` table (one rank observation per row).

use chrono::NaiveDate;
use serpbot_core::{Engine, Observation, Rank};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `trends` table, projected to what aggregation reads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub keyword_id: Uuid,
    pub observed_on: NaiveDate,
    /// 1-based rank, or `-1` for not found.
    pub position: i32,
}

impl TrendRow {
    #[must_use]
    pub fn into_observation(self, engine: Engine) -> Observation {
        Observation {
            keyword_id: self.keyword_id,
            engine,
            date: self.observed_on,
            rank: Rank::from_stored(self.position),
        }
    }
}

/// Returns a keyword's observations on one engine, ordered by date ascending.
///
/// `after` is an exclusive lower bound on `observed_on`; `None` returns the
/// full history.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends(
    pool: &PgPool,
    keyword_id: Uuid,
    engine: Engine,
    after: Option<NaiveDate>,
) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(
        "SELECT keyword_id, observed_on, position \
         FROM trends \
         WHERE keyword_id = $1 \
           AND engine = $2 \
           AND ($3::DATE IS NULL OR observed_on > $3) \
         ORDER BY observed_on, created_at",
    )
    .bind(keyword_id)
    .bind(engine.as_str())
    .bind(after)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
