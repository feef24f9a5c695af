use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use tracing_subscriber::EnvFilter;
use tripwire_application::{DEFAULT_LOOKBACK, LogQuerySettings};
use tripwire_core::AppError;
use url::Url;

/// Backing store for audit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStoreConfig {
    Postgres { database_url: String },
    Redis { redis_url: String, key_prefix: String },
    Memory,
}

/// Source of tracker credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreConfig {
    Environment,
    Vault {
        address: String,
        token: String,
        mount: String,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub audit_store: AuditStoreConfig,
    pub log_search_base_url: String,
    pub log_search_api_token: Option<String>,
    pub secret_store: SecretStoreConfig,
    pub window_lookback: TimeDelta,
    pub query_settings: LogQuerySettings,
    pub http_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(migrate_only: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_env_or(&lookup, "API_PORT", 3001_u16)?;

        let audit_store = match lookup("AUDIT_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => AuditStoreConfig::Postgres {
                database_url: required_env(&lookup, "DATABASE_URL")?,
            },
            "redis" => AuditStoreConfig::Redis {
                redis_url: required_env(&lookup, "REDIS_URL")?,
                key_prefix: lookup("REDIS_KEY_PREFIX")
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "tripwire:audit".to_owned()),
            },
            "memory" => AuditStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "AUDIT_STORE must be one of 'postgres', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && !matches!(audit_store, AuditStoreConfig::Postgres { .. }) {
            return Err(AppError::Validation(
                "migrate requires AUDIT_STORE=postgres".to_owned(),
            ));
        }

        let log_search_base_url = required_env(&lookup, "LOG_SEARCH_BASE_URL")?;
        Url::parse(log_search_base_url.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid LOG_SEARCH_BASE_URL: {error}"))
        })?;
        let log_search_api_token =
            lookup("LOG_SEARCH_API_TOKEN").filter(|value| !value.trim().is_empty());

        let secret_store = match lookup("SECRET_STORE")
            .unwrap_or_else(|| "environment".to_owned())
            .as_str()
        {
            "environment" => SecretStoreConfig::Environment,
            "vault" => SecretStoreConfig::Vault {
                address: required_env(&lookup, "VAULT_ADDR")?,
                token: required_env(&lookup, "VAULT_TOKEN")?,
                mount: lookup("VAULT_MOUNT")
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "secret".to_owned()),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "SECRET_STORE must be either 'environment' or 'vault', got '{other}'"
                )));
            }
        };

        let lookback_minutes =
            parse_env_or(&lookup, "WINDOW_LOOKBACK_MINUTES", DEFAULT_LOOKBACK.num_minutes())?;
        if lookback_minutes <= 0 {
            return Err(AppError::Validation(
                "WINDOW_LOOKBACK_MINUTES must be positive".to_owned(),
            ));
        }
        let window_lookback = TimeDelta::try_minutes(lookback_minutes).ok_or_else(|| {
            AppError::Validation("WINDOW_LOOKBACK_MINUTES is out of range".to_owned())
        })?;

        let defaults = LogQuerySettings::default();
        let result_limit = parse_env_or(&lookup, "QUERY_RESULT_LIMIT", defaults.result_limit)?;
        if result_limit == 0 {
            return Err(AppError::Validation(
                "QUERY_RESULT_LIMIT must be at least 1".to_owned(),
            ));
        }
        let poll_interval_ms = parse_env_or(
            &lookup,
            "QUERY_POLL_INTERVAL_MS",
            u64::try_from(defaults.poll_interval.as_millis()).unwrap_or(5_000),
        )?;

        let http_timeout_seconds = parse_env_or(&lookup, "HTTP_TIMEOUT_SECONDS", 30_u64)?;

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            audit_store,
            log_search_base_url,
            log_search_api_token,
            secret_store,
            window_lookback,
            query_settings: LogQuerySettings {
                result_limit,
                poll_interval: Duration::from_millis(poll_interval_ms),
            },
            http_timeout: Duration::from_secs(http_timeout_seconds),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
