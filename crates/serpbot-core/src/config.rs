use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_or = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value is empty".to_string(),
            });
        }
        Ok(raw)
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("SERPBOT_ENV", "development"))?;

    let bind_addr = parse_or("SERPBOT_BIND_ADDR", "0.0.0.0:5000")?
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SERPBOT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SERPBOT_LOG_LEVEL", "info");
    let api_key_hash_salt = lookup("SERPBOT_API_KEY_HASH_SALT")
        .ok()
        .filter(|salt| !salt.is_empty());

    let db_max_connections = parse_or("SERPBOT_DB_MAX_CONNECTIONS", "10")?
        .parse::<u32>()
        .map_err(|e| invalid("SERPBOT_DB_MAX_CONNECTIONS", e.to_string()))?;
    let db_min_connections = parse_or("SERPBOT_DB_MIN_CONNECTIONS", "1")?
        .parse::<u32>()
        .map_err(|e| invalid("SERPBOT_DB_MIN_CONNECTIONS", e.to_string()))?;
    let db_acquire_timeout_secs = parse_or("SERPBOT_DB_ACQUIRE_TIMEOUT_SECS", "10")?
        .parse::<u64>()
        .map_err(|e| invalid("SERPBOT_DB_ACQUIRE_TIMEOUT_SECS", e.to_string()))?;

    if db_min_connections > db_max_connections {
        return Err(invalid(
            "SERPBOT_DB_MIN_CONNECTIONS",
            format!("must not exceed SERPBOT_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }

    let max_rank = parse_or("SERPBOT_MAX_RANK", "100")?
        .parse::<i32>()
        .map_err(|e| invalid("SERPBOT_MAX_RANK", e.to_string()))?;
    if max_rank < 1 {
        return Err(invalid("SERPBOT_MAX_RANK", "must be at least 1".to_string()));
    }

    let rate_limit_per_minute = parse_or("SERPBOT_RATE_LIMIT_PER_MINUTE", "120")?
        .parse::<usize>()
        .map_err(|e| invalid("SERPBOT_RATE_LIMIT_PER_MINUTE", e.to_string()))?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "SERPBOT_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        api_key_hash_salt,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        max_rank,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SERPBOT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
