use crate::app_config::{AppConfig, Environment, ValidationMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("PRICEBOT_ENV", "development"))?;
    let log_level = or_default("PRICEBOT_LOG_LEVEL", "info");
    let proxies_path = PathBuf::from(or_default("PRICEBOT_PROXIES_PATH", "./config/proxies.yaml"));
    let tracked_path = PathBuf::from(or_default("PRICEBOT_TRACKED_PATH", "./config/tracked.yaml"));

    let max_retries = parse_u32("PRICEBOT_MAX_RETRIES", "5")?;
    if max_retries == 0 {
        return Err(invalid("PRICEBOT_MAX_RETRIES", "must be at least 1".to_string()));
    }

    let retry_delay_min_ms = parse_u64("PRICEBOT_RETRY_DELAY_MIN_MS", "5000")?;
    let retry_delay_max_ms = parse_u64("PRICEBOT_RETRY_DELAY_MAX_MS", "15000")?;
    if retry_delay_min_ms > retry_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "PRICEBOT_RETRY_DELAY_MIN_MS ({retry_delay_min_ms}) exceeds PRICEBOT_RETRY_DELAY_MAX_MS ({retry_delay_max_ms})"
        )));
    }

    let request_timeout_secs = parse_u64("PRICEBOT_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PRICEBOT_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }

    let concurrency_limit = parse_usize("PRICEBOT_CONCURRENCY_LIMIT", "5")?.max(1);

    let default_currency = or_default("PRICEBOT_DEFAULT_CURRENCY", "EUR").to_ascii_uppercase();
    if default_currency.len() != 3 || !default_currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(
            "PRICEBOT_DEFAULT_CURRENCY",
            format!("'{default_currency}' is not a three-letter ISO 4217 code"),
        ));
    }

    let validation_mode = parse_validation_mode(&or_default("PRICEBOT_VALIDATION_MODE", "syntactic"))?;

    let user_agents = lookup("PRICEBOT_USER_AGENTS")
        .map(|raw| parse_user_agents(&raw))
        .unwrap_or_default();

    Ok(AppConfig {
        env,
        log_level,
        proxies_path,
        tracked_path,
        max_retries,
        retry_delay_min_ms,
        retry_delay_max_ms,
        request_timeout_secs,
        concurrency_limit,
        default_currency,
        validation_mode,
        user_agents,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than the three known names.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEBOT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_validation_mode(s: &str) -> Result<ValidationMode, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "syntactic" => Ok(ValidationMode::Syntactic),
        "network" => Ok(ValidationMode::Network),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEBOT_VALIDATION_MODE".to_string(),
            reason: format!("expected 'syntactic' or 'network', got '{other}'"),
        }),
    }
}

/// User agents are `|`-separated because the strings themselves contain commas.
fn parse_user_agents(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
