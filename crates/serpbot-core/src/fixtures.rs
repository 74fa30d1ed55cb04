//! Seed fixtures: clients, their websites, keywords, and rank history.
//!
//! Used by `serpbot-cli seed` to populate development and demo databases.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Engine, NOT_FOUND_POSITION};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationFixture {
    pub engine: Engine,
    pub date: NaiveDate,
    /// 1-based position, or `-1` when the keyword was not found.
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordFixture {
    pub name: String,
    #[serde(default)]
    pub observations: Vec<ObservationFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteFixture {
    pub domain: String,
    #[serde(default)]
    pub keywords: Vec<KeywordFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFixture {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub websites: Vec<WebsiteFixture>,
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub clients: Vec<ClientFixture>,
}

/// Load and validate a seed fixture from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_fixtures(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FixturesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_fixtures(&content)
}

/// Parse and validate a seed fixture from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_fixtures(content: &str) -> Result<SeedFile, ConfigError> {
    let seed: SeedFile = serde_yaml::from_str(content).map_err(ConfigError::FixturesFileParse)?;
    validate_fixtures(&seed)?;
    Ok(seed)
}

fn validate_fixtures(seed: &SeedFile) -> Result<(), ConfigError> {
    let mut usernames = HashSet::new();

    for client in &seed.clients {
        if client.username.trim().is_empty() {
            return Err(ConfigError::Validation(
                "client username must be non-empty".to_string(),
            ));
        }
        if !usernames.insert(client.username.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate client username: '{}'",
                client.username
            )));
        }

        let mut domains = HashSet::new();
        for website in &client.websites {
            if !is_plausible_domain(&website.domain) {
                return Err(ConfigError::Validation(format!(
                    "client '{}' has invalid domain '{}'",
                    client.username, website.domain
                )));
            }
            if !domains.insert(website.domain.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "client '{}' lists domain '{}' twice",
                    client.username, website.domain
                )));
            }
            validate_keywords(website)?;
        }
    }

    Ok(())
}

fn validate_keywords(website: &WebsiteFixture) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for keyword in &website.keywords {
        if keyword.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "website '{}' has a blank keyword",
                website.domain
            )));
        }
        if !names.insert(keyword.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "website '{}' lists keyword '{}' twice",
                website.domain, keyword.name
            )));
        }

        let mut days = HashSet::new();
        for observation in &keyword.observations {
            if observation.position < 1 && observation.position != NOT_FOUND_POSITION {
                return Err(ConfigError::Validation(format!(
                    "keyword '{}' has invalid position {} on {}; must be >= 1 or {NOT_FOUND_POSITION}",
                    keyword.name, observation.position, observation.date
                )));
            }
            if !days.insert((observation.engine, observation.date)) {
                return Err(ConfigError::Validation(format!(
                    "keyword '{}' has two {} observations on {}",
                    keyword.name, observation.engine, observation.date
                )));
            }
        }
    }

    Ok(())
}

/// Cheap structural check: dot-separated labels of alphanumerics and hyphens.
fn is_plausible_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
#[path = "fixtures_test.rs"]
mod tests;
