use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {var}: {detail}")]
    Invalid { var: String, detail: String },
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Fully resolved runtime configuration for `locker-server`, assembled from
/// environment variables (optionally loaded from a `.env` file).
#[derive(Debug, Clone)]
pub struct Config {
    pub app_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,

    pub jwt_access_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_access_ttl: chrono::Duration,
    pub jwt_refresh_ttl: chrono::Duration,

    pub hold_ttl: Duration,
    pub sweep_interval: Duration,

    pub application_start: DateTime<Utc>,
    pub application_end: DateTime<Utc>,
}

impl Config {
    /// Load configuration from the process environment. Calls `dotenvy::dotenv()`
    /// first so local development can keep secrets in a `.env` file; a missing
    /// `.env` is not an error, only a missing required variable is.
    pub fn from_env() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = ?err, "no .env file loaded, continuing with process environment");
        }

        let app_addr = env_var("APP_ADDR")?;
        let app_addr = app_addr
            .parse::<SocketAddr>()
            .map_err(|e| invalid("APP_ADDR", e))?;

        let database_url = env_var("DATABASE_URL")?;
        let redis_url = env_var("REDIS_URL")?;

        let jwt_access_secret = env_var("JWT_ACCESS_SECRET")?;
        if jwt_access_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_ACCESS_SECRET".to_string(),
                detail: "must be at least 32 bytes".to_string(),
            });
        }
        let jwt_issuer = env_var("JWT_ISS")?;
        let jwt_audience = env_var("JWT_AUD")?;

        let jwt_access_ttl_min: i64 = parse_env("JWT_ACCESS_TTL_MIN")?;
        let jwt_refresh_ttl_h: i64 = parse_env("JWT_REFRESH_TTL_H")?;

        let hold_ttl_secs: u64 = parse_env("HOLD_TTL_SECONDS")?;
        let sweep_interval_secs: u64 = env_var("REAPER_SWEEP_INTERVAL_SECONDS")
            .ok()
            .map(|v| v.parse::<u64>().map_err(|e| invalid("REAPER_SWEEP_INTERVAL_SECONDS", e)))
            .transpose()?
            .unwrap_or(10);

        let application_start = parse_env::<DateTime<Utc>>("LOCKER_APPLICATION_START")?;
        let application_end = parse_env::<DateTime<Utc>>("LOCKER_APPLICATION_END")?;
        if application_end <= application_start {
            return Err(ConfigError::Invalid {
                var: "LOCKER_APPLICATION_END".to_string(),
                detail: "must be after LOCKER_APPLICATION_START".to_string(),
            });
        }

        Ok(Self {
            app_addr,
            database_url,
            redis_url,
            jwt_access_secret,
            jwt_issuer,
            jwt_audience,
            jwt_access_ttl: chrono::Duration::minutes(jwt_access_ttl_min),
            jwt_refresh_ttl: chrono::Duration::hours(jwt_refresh_ttl_h),
            hold_ttl: Duration::from_secs(hold_ttl_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            application_start,
            application_end,
        })
    }

    /// Whether `now` falls inside the configured application window.
    pub fn is_application_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.application_start && now < self.application_end
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name.to_string()))
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = env_var(name)?;
    raw.parse::<T>().map_err(|e| invalid(name, e))
}

fn invalid(var: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        detail: err.to_string(),
    }
}
