use std::{env, fmt::Display, str::FromStr};

use reqwest::Url;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PREDICTOR_URL: &str = "http://localhost:5000/predict";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide settings, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub predictor_url: Url,
    pub host: String,
    pub port: u16,
    /// `None` leaves request bodies unbounded; size policy belongs to the predictor.
    pub body_limit_bytes: Option<usize>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests don't touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let predictor_url = try_load(&lookup, "PREDICTOR_URL", DEFAULT_PREDICTOR_URL, "URL")?;
        let host = try_load(&lookup, "HOST", DEFAULT_HOST, "host")?;
        let port = try_load(&lookup, "PORT", DEFAULT_PORT, "number between 0 and 65535")?;

        let body_limit_bytes = match lookup("BODY_LIMIT_MB") {
            Some(raw) => {
                let mb: usize = parse("BODY_LIMIT_MB", &raw, "integer")?;
                let bytes = mb
                    .checked_mul(1024 * 1024)
                    .ok_or_else(|| ConfigError::Invalid {
                        key: "BODY_LIMIT_MB",
                        expected: "integer",
                        value: raw.clone(),
                        reason: "too large".to_string(),
                    })?;
                Some(bytes)
            }
            None => None,
        };

        Ok(Self {
            predictor_url,
            host,
            port,
            body_limit_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<F, T>(
    lookup: &F,
    key: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse(key, &raw, expected)
}

fn parse<T>(key: &'static str, raw: &str, expected: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        expected,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
