use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use tracing::Level;

use crate::timekeeping::classifier::DEFAULT_LATE_THRESHOLD_MINUTES;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_level: Level,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Timekeeping rules
    pub late_threshold_minutes: i32,
    pub early_leave_tolerance_minutes: i32,
    pub session_tick: Duration,
    pub scan_debounce: Duration,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let rate_protected_per_min = parsed_or("RATE_PROTECTED_PER_MIN", 1000u32)?;
        if rate_protected_per_min == 0 {
            bail!("RATE_PROTECTED_PER_MIN must be greater than zero");
        }

        let late_threshold_minutes =
            parsed_or("LATE_THRESHOLD_MINUTES", DEFAULT_LATE_THRESHOLD_MINUTES)?;
        let early_leave_tolerance_minutes = parsed_or("EARLY_LEAVE_TOLERANCE_MINUTES", 5i32)?;
        if late_threshold_minutes < 0 || early_leave_tolerance_minutes < 0 {
            bail!("timekeeping tolerances must not be negative");
        }

        let session_tick_secs = parsed_or("SESSION_TICK_SECS", 1u64)?.max(1);

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_level: parsed_or("LOG_LEVEL", Level::DEBUG)?,
            rate_protected_per_min,
            late_threshold_minutes,
            early_leave_tolerance_minutes,
            session_tick: Duration::from_secs(session_tick_secs),
            scan_debounce: Duration::from_secs(parsed_or("SCAN_DEBOUNCE_SECS", 3u64)?),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            // nothing listens on port 1, so every query fails fast
            database_url: "mysql://root@127.0.0.1:1/hrm_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            log_level: Level::DEBUG,
            rate_protected_per_min: 1000,
            late_threshold_minutes: DEFAULT_LATE_THRESHOLD_MINUTES,
            early_leave_tolerance_minutes: 5,
            session_tick: Duration::from_secs(1),
            scan_debounce: Duration::from_secs(3),
        }
    }
}
