//! Domain types shared by the store, the engine, and the HTTP layer.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stored position meaning "the keyword was not found in the results".
pub const NOT_FOUND_POSITION: i32 = -1;

/// A search engine for which rank observations are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Google,
    Bing,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Google, Engine::Bing];

    /// Tag used on the wire and in the `trends.engine` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Google => "google",
            Engine::Bing => "bing",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown engine '{0}'")]
pub struct UnknownEngine(pub String);

impl FromStr for Engine {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Engine::ALL
            .into_iter()
            .find(|engine| engine.as_str() == s)
            .ok_or_else(|| UnknownEngine(s.to_string()))
    }
}

/// A named window of observations, relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::SevenDays, Period::ThirtyDays, Period::All];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Period::SevenDays => "7d",
            Period::ThirtyDays => "30d",
            Period::All => "all",
        }
    }

    /// Number of days the window reaches back, or `None` for all time.
    #[must_use]
    pub fn lookback_days(self) -> Option<u64> {
        match self {
            Period::SevenDays => Some(7),
            Period::ThirtyDays => Some(30),
            Period::All => None,
        }
    }

    /// Exclusive lower bound on observation dates: only `date > bound` is kept.
    ///
    /// Returns `None` for [`Period::All`], and also when subtracting the
    /// lookback would underflow the calendar.
    #[must_use]
    pub fn lower_bound(self, today: NaiveDate) -> Option<NaiveDate> {
        self.lookback_days()
            .and_then(|days| today.checked_sub_days(Days::new(days)))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}

/// A single recorded standing of a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// 1-based position in the engine's results.
    Position(i32),
    /// The keyword did not appear in the collected results.
    NotFound,
}

impl Rank {
    /// Interpret a stored `position` column value.
    ///
    /// Anything below 1 is treated as not-found; the collector only ever
    /// writes [`NOT_FOUND_POSITION`] for that case.
    #[must_use]
    pub fn from_stored(position: i32) -> Self {
        if position >= 1 {
            Rank::Position(position)
        } else {
            Rank::NotFound
        }
    }

    #[must_use]
    pub fn to_stored(self) -> i32 {
        match self {
            Rank::Position(position) => position,
            Rank::NotFound => NOT_FOUND_POSITION,
        }
    }
}

/// A tracked website and the client that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Website {
    pub id: Uuid,
    pub domain: String,
    /// Username of the owning client.
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub id: Uuid,
    pub website_id: Uuid,
    pub name: String,
}

/// One rank for one keyword, on one engine, on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub keyword_id: Uuid,
    pub engine: Engine,
    pub date: NaiveDate,
    pub rank: Rank,
}
