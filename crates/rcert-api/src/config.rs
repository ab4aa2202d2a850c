//! # Service Configuration
//!
//! Read once at startup from the process environment. Absent variables
//! take defaults; present but malformed ones fail startup.
//!
//! | Variable                      | Default    |
//! |-------------------------------|------------|
//! | `PORT`                        | `8080`     |
//! | `AUTH_TOKEN`                  | unset (auth disabled) |
//! | `RCERT_ANCHOR_URL`            | unset (in-memory ledger) |
//! | `RCERT_ANCHOR_NETWORK`        | `local`    |
//! | `RCERT_ANCHOR_TIMEOUT_MS`     | `2000`     |
//! | `RCERT_BATCH_CONCURRENCY`     | `8`        |
//! | `RCERT_BATCH_MAX_ITEMS`       | `100`      |
//! | `RCERT_BATCH_RETENTION`       | `256`      |
//! | `RCERT_PUBLIC_CACHE_TTL_SECS` | `30`       |
//! | `RCERT_DISCLOSURE`            | `detailed` |
//! | `RCERT_ADMIN_ACTORS`          | empty      |
//!
//! The signing seed (`RCERT_SIGNING_KEY_HEX`) is not part of this struct;
//! it is read by [`rcert_crypto::EnvSigner`] when the state is built.

use std::str::FromStr;
use std::time::Duration;

use rcert_batch::BatchConfig;
use rcert_cert::DisclosurePolicy;
use thiserror::Error;

/// Environment variable holding the Ed25519 signing seed.
pub const SIGNING_KEY_VAR: &str = "RCERT_SIGNING_KEY_HEX";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the API server.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Static bearer token for dashboard routes. `None` disables auth.
    pub auth_token: Option<String>,
    pub anchor_url: Option<String>,
    pub anchor_network: String,
    pub anchor_timeout: Duration,
    pub batch: BatchConfig,
    /// Finished batches kept for polling and export.
    pub batch_retention: usize,
    pub public_cache_ttl_secs: u64,
    pub disclosure: DisclosurePolicy,
    /// Actors allowed to revoke any certificate.
    pub admin_actors: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("anchor_url", &self.anchor_url)
            .field("anchor_network", &self.anchor_network)
            .field("anchor_timeout", &self.anchor_timeout)
            .field("batch", &self.batch)
            .field("batch_retention", &self.batch_retention)
            .field("public_cache_ttl_secs", &self.public_cache_ttl_secs)
            .field("disclosure", &self.disclosure)
            .field("admin_actors", &self.admin_actors)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            anchor_url: None,
            anchor_network: "local".to_string(),
            anchor_timeout: Duration::from_millis(2000),
            batch: BatchConfig::default(),
            batch_retention: 256,
            public_cache_ttl_secs: 30,
            disclosure: DisclosurePolicy::Detailed,
            admin_actors: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through `lookup`. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = parse_or("PORT", get("PORT"), defaults.port)?;
        let anchor_timeout_ms = parse_or(
            "RCERT_ANCHOR_TIMEOUT_MS",
            get("RCERT_ANCHOR_TIMEOUT_MS"),
            defaults.anchor_timeout.as_millis() as u64,
        )?;
        if anchor_timeout_ms == 0 {
            return Err(invalid("RCERT_ANCHOR_TIMEOUT_MS", "0", "must be positive"));
        }
        let concurrency = parse_or(
            "RCERT_BATCH_CONCURRENCY",
            get("RCERT_BATCH_CONCURRENCY"),
            defaults.batch.concurrency,
        )?;
        if concurrency == 0 {
            return Err(invalid("RCERT_BATCH_CONCURRENCY", "0", "must be at least 1"));
        }
        let max_items = parse_or(
            "RCERT_BATCH_MAX_ITEMS",
            get("RCERT_BATCH_MAX_ITEMS"),
            defaults.batch.max_items,
        )?;
        if max_items == 0 {
            return Err(invalid("RCERT_BATCH_MAX_ITEMS", "0", "must be at least 1"));
        }
        let batch_retention = parse_or(
            "RCERT_BATCH_RETENTION",
            get("RCERT_BATCH_RETENTION"),
            defaults.batch_retention,
        )?;
        if batch_retention == 0 {
            return Err(invalid("RCERT_BATCH_RETENTION", "0", "must be at least 1"));
        }
        let public_cache_ttl_secs = parse_or(
            "RCERT_PUBLIC_CACHE_TTL_SECS",
            get("RCERT_PUBLIC_CACHE_TTL_SECS"),
            defaults.public_cache_ttl_secs,
        )?;
        let disclosure = parse_or(
            "RCERT_DISCLOSURE",
            get("RCERT_DISCLOSURE"),
            defaults.disclosure,
        )?;

        let anchor_url = get("RCERT_ANCHOR_URL").map(|u| u.trim().to_string());
        if let Some(url) = &anchor_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("RCERT_ANCHOR_URL", url, "must start with http:// or https://"));
            }
        }

        let admin_actors = get("RCERT_ADMIN_ACTORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            auth_token: get("AUTH_TOKEN"),
            anchor_url,
            anchor_network: get("RCERT_ANCHOR_NETWORK").unwrap_or(defaults.anchor_network),
            anchor_timeout: Duration::from_millis(anchor_timeout_ms),
            batch: BatchConfig {
                concurrency,
                max_items,
            },
            batch_retention,
            public_cache_ttl_secs,
            disclosure,
            admin_actors,
        })
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &value, &e.to_string())),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
