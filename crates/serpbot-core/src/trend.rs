//! Rank trend aggregation.
//!
//! Turns sparse per-keyword observations into a dense, date-aligned matrix a
//! chart can render directly: one shared ascending date axis, and one series
//! per keyword with exactly one value per axis date.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Engine, Keyword, Observation, Period, Rank, Website};

/// Display value used for a "not found" observation unless configured otherwise.
pub const DEFAULT_MAX_RANK: i32 = 100;

/// How stored ranks are rendered in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPolicy {
    /// Value substituted for [`Rank::NotFound`]: the worst position shown.
    pub max_rank: i32,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            max_rank: DEFAULT_MAX_RANK,
        }
    }
}

impl RankPolicy {
    #[must_use]
    pub fn resolve(self, rank: Rank) -> i32 {
        match rank {
            Rank::Position(position) => position,
            Rank::NotFound => self.max_rank,
        }
    }
}

/// Chart-ready rank matrix for one website and engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedSeries {
    /// Strictly ascending, de-duplicated observation dates.
    #[serde(rename = "labels")]
    pub date_labels: Vec<NaiveDate>,
    pub keywords: Vec<KeywordSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordSeries {
    pub label: String,
    /// One entry per date label. `None` means the keyword has no observation
    /// on that date (serialized as `null`).
    pub data: Vec<Option<i32>>,
}

/// A keyword together with its already-filtered observations.
#[derive(Debug, Clone)]
pub struct KeywordObservations {
    pub keyword: Keyword,
    pub observations: Vec<Observation>,
}

/// Build the aligned matrix from per-keyword observations.
///
/// Output keyword order follows `input` order. When a keyword has several
/// observations for the same date the first one wins.
#[must_use]
pub fn aggregate(input: &[KeywordObservations], policy: RankPolicy) -> AggregatedSeries {
    let mut axis = BTreeSet::new();
    let mut per_keyword = Vec::with_capacity(input.len());

    for entry in input {
        let mut ranks: BTreeMap<NaiveDate, Rank> = BTreeMap::new();
        for observation in &entry.observations {
            axis.insert(observation.date);
            ranks.entry(observation.date).or_insert(observation.rank);
        }
        per_keyword.push((entry.keyword.name.as_str(), ranks));
    }

    let date_labels: Vec<NaiveDate> = axis.into_iter().collect();

    let keywords = per_keyword
        .into_iter()
        .map(|(label, ranks)| KeywordSeries {
            label: label.to_string(),
            data: date_labels
                .iter()
                .map(|date| ranks.get(date).map(|rank| policy.resolve(*rank)))
                .collect(),
        })
        .collect();

    AggregatedSeries {
        date_labels,
        keywords,
    }
}

/// Read access to websites, keywords, and rank observations.
pub trait TrendStore: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_website(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Website>, Self::Error>> + Send;

    /// Keywords of a website, in the store's stable order.
    fn list_keywords(
        &self,
        website_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Keyword>, Self::Error>> + Send;

    /// Observations for one keyword on one engine, ordered by date ascending.
    ///
    /// When `after` is set only observations with `date > after` are returned.
    fn list_observations(
        &self,
        keyword_id: Uuid,
        engine: Engine,
        after: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send;
}

/// Inputs of a trend computation. Tags are validated by [`compute_trend`].
#[derive(Debug, Clone, Copy)]
pub struct TrendRequest<'a> {
    /// Authenticated client username; must own the website.
    pub owner: &'a str,
    pub website_id: Uuid,
    pub engine: &'a str,
    pub period: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendErrorKind {
    NotFound,
    InvalidInput,
    Internal,
}

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("website does not exist")]
    WebsiteNotFound(Uuid),
    #[error("engine does not exist")]
    EngineNotFound(String),
    #[error("invalid period selected; must be one of: 7d, 30d, all")]
    InvalidPeriod(String),
    #[error("unable to process the request")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TrendError {
    fn store<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TrendError::Store(Box::new(error))
    }

    #[must_use]
    pub fn kind(&self) -> TrendErrorKind {
        match self {
            TrendError::WebsiteNotFound(_) | TrendError::EngineNotFound(_) => {
                TrendErrorKind::NotFound
            }
            TrendError::InvalidPeriod(_) => TrendErrorKind::InvalidInput,
            TrendError::Store(_) => TrendErrorKind::Internal,
        }
    }
}

/// Resolve the engine and period tags of a request, engine first.
///
/// # Errors
///
/// Returns [`TrendError::EngineNotFound`] or [`TrendError::InvalidPeriod`].
pub fn parse_tags(engine: &str, period: &str) -> Result<(Engine, Period), TrendError> {
    let engine: Engine = engine
        .parse()
        .map_err(|_| TrendError::EngineNotFound(engine.to_string()))?;
    let period: Period = period
        .parse()
        .map_err(|_| TrendError::InvalidPeriod(period.to_string()))?;
    Ok((engine, period))
}

/// Compute the rank trend of a website for one engine and period.
///
/// Tags are checked before the store is touched. A website that does not
/// exist and one owned by another client both yield
/// [`TrendError::WebsiteNotFound`]. Any store failure aborts the whole
/// computation.
///
/// # Errors
///
/// Returns [`TrendError`] for unknown tags, missing or foreign websites, and
/// store failures.
pub async fn compute_trend<S: TrendStore>(
    store: &S,
    request: TrendRequest<'_>,
    today: NaiveDate,
    policy: RankPolicy,
) -> Result<AggregatedSeries, TrendError> {
    let (engine, period) = parse_tags(request.engine, request.period)?;

    let website = store
        .find_website(request.website_id)
        .await
        .map_err(TrendError::store)?
        .filter(|website| website.owner == request.owner)
        .ok_or(TrendError::WebsiteNotFound(request.website_id))?;

    let after = period.lower_bound(today);
    let keywords = store
        .list_keywords(website.id)
        .await
        .map_err(TrendError::store)?;

    let mut input = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let observations = store
            .list_observations(keyword.id, engine, after)
            .await
            .map_err(TrendError::store)?;
        input.push(KeywordObservations {
            keyword,
            observations,
        });
    }

    let trend = aggregate(&input, policy);
    tracing::debug!(
        website_id = %website.id,
        engine = %engine,
        period = %period,
        keywords = trend.keywords.len(),
        dates = trend.date_labels.len(),
        "computed rank trend"
    );
    Ok(trend)
}

#[cfg(test)]
#[path = "trend_test.rs"]
mod tests;
