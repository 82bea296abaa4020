use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const PUBLIC_NOMINATIM_HOST: &str = "nominatim.openstreetmap.org";

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
    let env = parse_environment(&or_default("MEDFIND_ENV", "development"))?;
    let log_level = or_default("MEDFIND_LOG_LEVEL", "info");
    let gazetteer_path = lookup("MEDFIND_GAZETTEER_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let geocoder_base_url = or_default(
        "MEDFIND_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    // Test runs must not send traffic to the shared public instance.
    if env == Environment::Test
        && geocoder_base_url
            .to_lowercase()
            .contains(PUBLIC_NOMINATIM_HOST)
    {
        return Err(invalid(
            "MEDFIND_GEOCODER_BASE_URL",
            format!(
                "the public geocoder ({PUBLIC_NOMINATIM_HOST}) is not allowed when \
                 MEDFIND_ENV=test; point it at a local or mock provider"
            ),
        ));
    }
    let geocoder_user_agent = or_default(
        "MEDFIND_GEOCODER_USER_AGENT",
        "medfind/0.1 (hospital-search)",
    );
    if geocoder_user_agent.trim().is_empty() {
        return Err(invalid(
            "MEDFIND_GEOCODER_USER_AGENT",
            "geocoding providers reject anonymous clients; set a descriptive identifier"
                .to_string(),
        ));
    }
    let geocoder_timeout_secs = parse_u64("MEDFIND_GEOCODER_TIMEOUT_SECS", "5")?;
    if geocoder_timeout_secs == 0 {
        return Err(invalid(
            "MEDFIND_GEOCODER_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }
    let geocoder_region = or_default("MEDFIND_GEOCODER_REGION", "Maharashtra");
    let geocoder_country = or_default("MEDFIND_GEOCODER_COUNTRY", "India");
    let geocode_cache_ttl_secs = parse_u64("MEDFIND_GEOCODE_CACHE_TTL_SECS", "0")?;

    let default_radius_km = or_default("MEDFIND_DEFAULT_RADIUS_KM", "10")
        .parse::<f64>()
        .map_err(|e| invalid("MEDFIND_DEFAULT_RADIUS_KM", e.to_string()))?;
    if !default_radius_km.is_finite() || default_radius_km <= 0.0 {
        return Err(invalid(
            "MEDFIND_DEFAULT_RADIUS_KM",
            format!("radius must be a positive number of km, got {default_radius_km}"),
        ));
    }
    let use_radius_pushdown = parse_bool("MEDFIND_USE_RADIUS_PUSHDOWN", "false")?;

    let db_max_connections = parse_u32("MEDFIND_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MEDFIND_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MEDFIND_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        gazetteer_path,
        geocoder_base_url,
        geocoder_user_agent,
        geocoder_timeout_secs,
        geocoder_region,
        geocoder_country,
        geocode_cache_ttl_secs,
        default_radius_km,
        use_radius_pushdown,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MEDFIND_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
