use crate::app_config::{AppConfig, Environment};
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
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("SHORTLENS_ENV", "development"))?;
    let log_level = or_default("SHORTLENS_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("SHORTLENS_OUTPUT_DIR", "./data"));
    let pipeline_config_path = optional("SHORTLENS_PIPELINE_CONFIG").map(PathBuf::from);
    let youtube_api_key = optional("YOUTUBE_API_KEY");

    let max_short_seconds = match optional("SHORTLENS_MAX_SHORT_SECONDS") {
        None => None,
        Some(raw) => Some(parse_seconds("SHORTLENS_MAX_SHORT_SECONDS", &raw)?),
    };

    Ok(AppConfig {
        env,
        log_level,
        output_dir,
        pipeline_config_path,
        max_short_seconds,
        youtube_api_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHORTLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_seconds(var: &str, raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("must be a non-negative number, got {raw}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
