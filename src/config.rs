// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Every setting has
//! a default matching the fail-fast behavior of the token gate, so an empty
//! environment yields a working configuration.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_AUTH_CACHE_DIR` | Directory for cached JWKS documents | `/tmp/jwt-auth` |
//! | `JWT_AUTH_HTTP_TIMEOUT_SECS` | Timeout per discovery/JWKS request | `2` |
//! | `JWT_AUTH_MAX_RETRIES` | Retries after a transient fetch failure | `0` |
//! | `JWT_AUTH_RETRY_BACKOFF_MS` | First retry delay, doubled per attempt | `200` |
//! | `JWT_AUTH_CACHE_MAX_AGE_SECS` | Max age of a cache entry | unset (never stale) |
//! | `JWT_AUTH_REFETCH_ON_MISSING_KID` | Re-fetch when a cached set lacks the kid | `false` |
//! | `JWT_AUTH_TRUSTED_ISSUERS` | Comma-separated issuer allowlist | empty (any issuer) |
//! | `JWT_AUTH_REQUIRE_HTTPS` | Reject non-`https` issuer and JWKS URLs | `true` |
//! | `JWT_AUTH_LOG_FILE` | Append logs to this file, `-` for stderr | `/tmp/one-jwt-auth.log` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const CACHE_DIR_ENV: &str = "JWT_AUTH_CACHE_DIR";
pub const HTTP_TIMEOUT_ENV: &str = "JWT_AUTH_HTTP_TIMEOUT_SECS";
pub const MAX_RETRIES_ENV: &str = "JWT_AUTH_MAX_RETRIES";
pub const RETRY_BACKOFF_ENV: &str = "JWT_AUTH_RETRY_BACKOFF_MS";
pub const CACHE_MAX_AGE_ENV: &str = "JWT_AUTH_CACHE_MAX_AGE_SECS";
pub const REFETCH_ON_MISSING_KID_ENV: &str = "JWT_AUTH_REFETCH_ON_MISSING_KID";
pub const TRUSTED_ISSUERS_ENV: &str = "JWT_AUTH_TRUSTED_ISSUERS";
pub const REQUIRE_HTTPS_ENV: &str = "JWT_AUTH_REQUIRE_HTTPS";
pub const LOG_FILE_ENV: &str = "JWT_AUTH_LOG_FILE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default cache directory. One file per key identifier lives here.
pub const DEFAULT_CACHE_DIR: &str = "/tmp/jwt-auth";

/// Default timeout for each outbound HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(2);

/// Default log file of the login gate.
pub const DEFAULT_LOG_FILE: &str = "/tmp/one-jwt-auth.log";

/// `JWT_AUTH_LOG_FILE` value that sends logs to stderr.
pub const LOG_TO_STDERR: &str = "-";

/// Default delay before the first retry.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// How long a cached key set may be served before it is treated as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Cached entries never go stale.
    #[default]
    Forever,
    /// Entries older than this (by file modification time) are re-fetched.
    MaxAge(Duration),
}

/// Retry behavior for discovery and JWKS requests.
///
/// The default performs no retries: an unreachable identity provider fails
/// validation immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based), doubling each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Append to this file; `None` writes to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Token gate configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cache_dir: PathBuf,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
    pub freshness: Freshness,
    pub refetch_on_missing_kid: bool,
    pub trusted_issuers: Vec<String>,
    pub require_https: bool,
    pub log: LogConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            retry: RetryPolicy::default(),
            freshness: Freshness::Forever,
            refetch_on_missing_kid: false,
            trusted_issuers: Vec::new(),
            require_https: true,
            log: LogConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let cache_dir = get(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let http_timeout = match get(HTTP_TIMEOUT_ENV) {
            Some(v) => Duration::from_secs(parse_value(HTTP_TIMEOUT_ENV, &v)?),
            None => defaults.http_timeout,
        };

        let retry = RetryPolicy {
            max_retries: match get(MAX_RETRIES_ENV) {
                Some(v) => parse_value(MAX_RETRIES_ENV, &v)?,
                None => defaults.retry.max_retries,
            },
            backoff: match get(RETRY_BACKOFF_ENV) {
                Some(v) => Duration::from_millis(parse_value(RETRY_BACKOFF_ENV, &v)?),
                None => defaults.retry.backoff,
            },
        };

        let freshness = match get(CACHE_MAX_AGE_ENV) {
            Some(v) => Freshness::MaxAge(Duration::from_secs(parse_value(CACHE_MAX_AGE_ENV, &v)?)),
            None => Freshness::Forever,
        };

        let refetch_on_missing_kid = match get(REFETCH_ON_MISSING_KID_ENV) {
            Some(v) => parse_bool(REFETCH_ON_MISSING_KID_ENV, &v)?,
            None => defaults.refetch_on_missing_kid,
        };

        let trusted_issuers = get(TRUSTED_ISSUERS_ENV)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let require_https = match get(REQUIRE_HTTPS_ENV) {
            Some(v) => parse_bool(REQUIRE_HTTPS_ENV, &v)?,
            None => defaults.require_https,
        };

        let format = match get(LOG_FORMAT_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    value: v,
                    reason: "expected `json` or `pretty`".to_string(),
                })
            }
        };

        let file = match get(LOG_FILE_ENV) {
            Some(v) if v.trim() == LOG_TO_STDERR => None,
            Some(v) => Some(PathBuf::from(v)),
            None => defaults.log.file,
        };

        Ok(Self {
            cache_dir,
            http_timeout,
            retry,
            freshness,
            refetch_on_missing_kid,
            trusted_issuers,
            require_https,
            log: LogConfig { format, file },
        })
    }
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
