//! Server configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` via `dotenvy` before [`Config::from_env`] runs.
//! Parsing itself goes through [`Config::from_lookup`] so tests can feed a
//! map instead of mutating the process environment.

use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5174";
pub const DEFAULT_ACCESS_EXPIRES_MINS: i64 = 15;
pub const DEFAULT_REFRESH_EXPIRES_DAYS: i64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Signing secrets and lifetimes for access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_expires_mins: i64,
    pub refresh_expires_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub cors_origin: String,
    pub cookie_secure: bool,
    pub jwt: JwtConfig,
}

impl Config {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    /// - `JWT_ACCESS_SECRET`, `JWT_REFRESH_SECRET`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `CORS_ORIGIN`: default `http://localhost:5174`
    /// - `COOKIE_SECURE`: default true unless `CORS_ORIGIN` is plain `http://`
    /// - `JWT_ACCESS_EXPIRES_MINS`: default 15
    /// - `JWT_REFRESH_EXPIRES_DAYS`: default 30
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or empty, or
    /// a numeric/boolean variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let access_secret = required(&lookup, "JWT_ACCESS_SECRET")?;
        let refresh_secret = required(&lookup, "JWT_REFRESH_SECRET")?;
        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_SECRET",
                reason: "must differ from JWT_ACCESS_SECRET".into(),
            });
        }

        let cors_origin = lookup("CORS_ORIGIN")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_owned());
        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "COOKIE_SECURE",
                reason: format!("expected a boolean, got '{raw}'"),
            })?,
            None => !cors_origin.starts_with("http://"),
        };

        let jwt = JwtConfig {
            access_secret,
            refresh_secret,
            access_expires_mins: positive(env_parse(&lookup, "JWT_ACCESS_EXPIRES_MINS", DEFAULT_ACCESS_EXPIRES_MINS)?, "JWT_ACCESS_EXPIRES_MINS")?,
            refresh_expires_days: positive(env_parse(&lookup, "JWT_REFRESH_EXPIRES_DAYS", DEFAULT_REFRESH_EXPIRES_DAYS)?, "JWT_REFRESH_EXPIRES_DAYS")?,
        };

        Ok(Self {
            database_url,
            port: env_parse(&lookup, "PORT", DEFAULT_PORT)?,
            db_max_connections: env_parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            cors_origin,
            cookie_secure,
            jwt,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn env_parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid { key, reason: e.to_string() }),
    }
}

fn positive(value: i64, key: &'static str) -> Result<i64, ConfigError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { key, reason: "must be positive".into() })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
