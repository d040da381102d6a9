use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// One year.
const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub api_prefix: String,
    pub jwt_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub groups_require_auth: bool,
    pub groups_file: Option<PathBuf>,
    pub max_concurrent_requests: usize,
    /// `None` disables write rate limiting.
    pub write_rate_limit_per_second: Option<NonZeroU32>,
}

impl Config {
    /// Reads configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let api_prefix = lookup("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string());
        if !api_prefix.starts_with('/') || api_prefix.len() < 2 || api_prefix.ends_with('/') {
            return Err(ConfigError::Invalid {
                name: "API_PREFIX",
                value: api_prefix,
                reason: "must start with '/' and must not end with '/'".into(),
            });
        }

        let bcrypt_cost = parse(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".into(),
            });
        }

        let jwt_ttl_hours = parse(&lookup, "JWT_TTL_HOURS", 24)?;
        if !(1..=MAX_TTL_HOURS).contains(&jwt_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                value: jwt_ttl_hours.to_string(),
                reason: format!("must be between 1 and {MAX_TTL_HOURS}"),
            });
        }

        let rate: u32 = parse(&lookup, "WRITE_RATE_LIMIT_PER_SECOND", 50)?;

        Ok(Self {
            jwt_secret,
            bind_addr: parse(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            api_prefix,
            jwt_ttl_hours,
            bcrypt_cost,
            groups_require_auth: parse(&lookup, "GROUPS_REQUIRE_AUTH", false)?,
            groups_file: lookup("GROUPS_FILE").map(PathBuf::from),
            max_concurrent_requests: parse(&lookup, "MAX_CONCURRENT_REQUESTS", 1024)?,
            write_rate_limit_per_second: NonZeroU32::new(rate),
        })
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
