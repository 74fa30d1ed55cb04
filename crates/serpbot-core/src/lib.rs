//! Domain model and rank trend engine for serpbot.

pub mod app_config;
pub mod config;
pub mod fixtures;
pub mod trend;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use fixtures::{
    load_fixtures, parse_fixtures, ClientFixture, KeywordFixture, ObservationFixture, SeedFile,
    WebsiteFixture,
};
pub use trend::{
    aggregate, compute_trend, parse_tags, AggregatedSeries, KeywordObservations, KeywordSeries,
    RankPolicy, TrendError, TrendErrorKind, TrendRequest, TrendStore, DEFAULT_MAX_RANK,
};
pub use types::{
    Engine, Keyword, Observation, Period, Rank, UnknownEngine, UnknownPeriod, Website,
    NOT_FOUND_POSITION,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read fixtures file {path}: {source}")]
    FixturesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fixtures file: {0}")]
    FixturesFileParse(#[source] serde_yaml::Error),
    #[error("fixture validation failed: {0}")]
    Validation(String),
}
