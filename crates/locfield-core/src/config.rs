use thiserror::Error;

use crate::app_config::FieldConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load field configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set but cannot be parsed.
pub fn load_field_config() -> Result<FieldConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_field_config_from_env()
}

/// Load field configuration from environment variables already in the process.
///
/// Unlike [`load_field_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set but cannot be parsed.
pub fn load_field_config_from_env() -> Result<FieldConfig, ConfigError> {
    build_field_config(|key| std::env::var(key))
}

/// Build field configuration using the provided env-var lookup function.
///
/// The core parsing logic is decoupled from the real environment so tests can
/// drive it with a plain `HashMap` lookup.
fn build_field_config<F>(lookup: F) -> Result<FieldConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = FieldConfig::default();

    let or_default = |var: &str, default: String| -> String {
        lookup(var).unwrap_or(default)
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    Ok(FieldConfig {
        onemap_base_url: or_default("LOCFIELD_ONEMAP_BASE_URL", defaults.onemap_base_url),
        request_timeout_secs: parse_u64(
            "LOCFIELD_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?,
        debounce_ms: parse_u64("LOCFIELD_DEBOUNCE_MS", defaults.debounce_ms)?,
        geolocation_timeout_ms: parse_u64(
            "LOCFIELD_GEOLOCATION_TIMEOUT_MS",
            defaults.geolocation_timeout_ms,
        )?,
        page_size: parse_usize("LOCFIELD_PAGE_SIZE", defaults.page_size)?,
        user_agent: or_default("LOCFIELD_USER_AGENT", defaults.user_agent),
    })
}
