use crate::app_config::{AppConfig, Environment};
use crate::trends::AcceptancePolicy;
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
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("TRENDWATCH_ENV", "development"));

    let bind_addr = parse_addr("TRENDWATCH_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("TRENDWATCH_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("TRENDWATCH_SEED_PATH", "./config/trends.yaml"));

    let db_max_connections = parse_u32("TRENDWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("TRENDWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TRENDWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let provider_base_url = or_default("TRENDWATCH_PROVIDER_BASE_URL", "https://trends.google.com");
    let provider_timeout_secs = parse_u64("TRENDWATCH_PROVIDER_TIMEOUT_SECS", "30")?;
    let provider_max_retries = parse_u32("TRENDWATCH_PROVIDER_MAX_RETRIES", "2")?;

    let refresh_delay_ms = parse_u64("TRENDWATCH_REFRESH_DELAY_MS", "1000")?;
    let rate_limit_cooldown_secs = parse_u64("TRENDWATCH_RATE_LIMIT_COOLDOWN_SECS", "60")?;

    let policy_raw = or_default("TRENDWATCH_ACCEPTANCE_POLICY", "reject-monotonic");
    let acceptance_policy = policy_raw
        .parse::<AcceptancePolicy>()
        .map_err(|reason| invalid("TRENDWATCH_ACCEPTANCE_POLICY", reason))?;

    let refresh_cron = lookup("TRENDWATCH_REFRESH_CRON")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        seed_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_base_url,
        provider_timeout_secs,
        provider_max_retries,
        refresh_delay_ms,
        rate_limit_cooldown_secs,
        acceptance_policy,
        refresh_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
