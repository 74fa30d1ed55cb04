//! Postgres-backed [`TrendStore`].

use chrono::NaiveDate;
use serpbot_core::{Engine, Keyword, Observation, TrendStore, Website};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{get_website_by_id, list_keywords_by_website, list_trends, DbError};

#[derive(Debug, Clone)]
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TrendStore for PgTrendStore {
    type Error = DbError;

    async fn find_website(&self, id: Uuid) -> Result<Option<Website>, DbError> {
        Ok(get_website_by_id(&self.pool, id).await?.map(Website::from))
    }

    async fn list_keywords(&self, website_id: Uuid) -> Result<Vec<Keyword>, DbError> {
        let rows = list_keywords_by_website(&self.pool, website_id).await?;
        Ok(rows.into_iter().map(Keyword::from).collect())
    }

    async fn list_observations(
        &self,
        keyword_id: Uuid,
        engine: Engine,
        after: Option<NaiveDate>,
    ) -> Result<Vec<Observation>, DbError> {
        let rows = list_trends(&self.pool, keyword_id, engine, after).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_observation(engine))
            .collect())
    }
}
