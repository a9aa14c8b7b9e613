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

/// Build application configuration from an env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
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

    let sheet_id = require("GROUNDCHECK_SHEET_ID")?;

    let env = parse_environment(&or_default("GROUNDCHECK_ENV", "development"));
    let bind_addr = parse_addr("GROUNDCHECK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GROUNDCHECK_LOG_LEVEL", "info");

    let target_url = or_default("GROUNDCHECK_TARGET_URL", "https://matchapro.web.bps.go.id")
        .trim_end_matches('/')
        .to_string();
    if !target_url.starts_with("http://") && !target_url.starts_with("https://") {
        return Err(invalid(
            "GROUNDCHECK_TARGET_URL",
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    let listing_path = normalize_path(&or_default("GROUNDCHECK_LISTING_PATH", "/dirgc"));

    let cdp_url = or_default("GROUNDCHECK_CDP_URL", "http://127.0.0.1:9222")
        .trim_end_matches('/')
        .to_string();
    let extra_headers = parse_headers(&or_default("GROUNDCHECK_EXTRA_HEADERS", "{}"))
        .map_err(|reason| invalid("GROUNDCHECK_EXTRA_HEADERS", reason))?;

    let diagnostics_raw = or_default("GROUNDCHECK_DIAGNOSTICS_DIR", "./diagnostics");
    let diagnostics_dir = if diagnostics_raw.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(diagnostics_raw))
    };

    let login_timeout_ticks = parse_u32("GROUNDCHECK_LOGIN_TIMEOUT_TICKS", "600")?;
    let login_poll_ms = parse_u64("GROUNDCHECK_LOGIN_POLL_MS", "1000")?;
    let navigation_timeout_secs = parse_u64("GROUNDCHECK_NAVIGATION_TIMEOUT_SECS", "30")?;
    let settle_navigation_ms = parse_u64("GROUNDCHECK_SETTLE_NAVIGATION_MS", "3000")?;
    let settle_click_ms = parse_u64("GROUNDCHECK_SETTLE_CLICK_MS", "3000")?;
    let settle_input_ms = parse_u64("GROUNDCHECK_SETTLE_INPUT_MS", "2000")?;

    let sheets_base_url = or_default("GROUNDCHECK_SHEETS_BASE_URL", "https://docs.google.com");
    let sheets_timeout_secs = parse_u64("GROUNDCHECK_SHEETS_TIMEOUT_SECS", "30")?;
    let sheets_max_retries = parse_u32("GROUNDCHECK_SHEETS_MAX_RETRIES", "3")?;
    let sheets_retry_backoff_ms = parse_u64("GROUNDCHECK_SHEETS_RETRY_BACKOFF_MS", "500")?;

    Ok(AppConfig {
        sheet_id,
        env,
        bind_addr,
        log_level,
        target_url,
        listing_path,
        cdp_url,
        extra_headers,
        diagnostics_dir,
        login_timeout_ticks,
        login_poll_ms,
        navigation_timeout_secs,
        settle_navigation_ms,
        settle_click_ms,
        settle_input_ms,
        sheets_base_url,
        sheets_timeout_secs,
        sheets_max_retries,
        sheets_retry_backoff_ms,
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

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Parses a JSON object of header name to string value.
fn parse_headers(raw: &str) -> Result<Vec<(String, String)>, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let serde_json::Value::Object(map) = value else {
        return Err("expected a JSON object of header names to values".to_string());
    };

    map.into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => Ok((name, s)),
            other => Err(format!("header '{name}' must be a string, got {other}")),
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
