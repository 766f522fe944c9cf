use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a config
/// pointing at a local Postgres on the standard port.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let db_host = or_default("QTD2PG_DB_HOST", "localhost");
    let db_port: u16 = parse_as("QTD2PG_DB_PORT", &or_default("QTD2PG_DB_PORT", "5432"))?;
    let db_user = or_default("QTD2PG_DB_USER", "postgres");
    let db_password = lookup("QTD2PG_DB_PASSWORD").ok().filter(|p| !p.is_empty());
    let maintenance_db = or_default("QTD2PG_MAINTENANCE_DB", "postgres");
    let exiftool_path = PathBuf::from(or_default("QTD2PG_EXIFTOOL", "exiftool"));
    let settings_path = PathBuf::from(or_default("QTD2PG_SETTINGS_PATH", "./config/settings.yaml"));
    let log_level = or_default("QTD2PG_LOG_LEVEL", "info");

    let db_max_connections: u32 = parse_as(
        "QTD2PG_DB_MAX_CONNECTIONS",
        &or_default("QTD2PG_DB_MAX_CONNECTIONS", "5"),
    )?;
    let db_min_connections: u32 = parse_as(
        "QTD2PG_DB_MIN_CONNECTIONS",
        &or_default("QTD2PG_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "QTD2PG_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("QTD2PG_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "QTD2PG_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "{db_min_connections} exceeds QTD2PG_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        });
    }

    Ok(AppConfig {
        db_host,
        db_port,
        db_user,
        db_password,
        maintenance_db,
        exiftool_path,
        settings_path,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
