use std::env;

use rolegate_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SESSION_KEY_PREFIX: &str = "rolegate:session";

/// Backing store for the user directory and audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process-local maps.
    Memory,
    /// PostgreSQL with embedded migrations.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Pool size.
        max_connections: u32,
    },
}

/// Backing store for the session cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCacheConfig {
    /// Process-local map.
    Memory,
    /// Redis with a key prefix.
    Redis {
        /// Connection string.
        redis_url: String,
        /// Prefix prepended to every cache key.
        key_prefix: String,
    },
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory and audit store.
    pub store: StoreConfig,
    /// Session cache store.
    pub session_cache: SessionCacheConfig,
}

impl RuntimeConfig {
    /// Loads `.env` when present and reads the process environment.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let store = match lookup("ROLEGATE_STORE")
            .unwrap_or_else(|| "memory".to_owned())
            .as_str()
        {
            "memory" => StoreConfig::Memory,
            "postgres" => {
                let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(value) => value.parse::<u32>().map_err(|error| {
                        AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
                    })?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };

                StoreConfig::Postgres {
                    database_url: required_non_empty(&lookup, "DATABASE_URL")?,
                    max_connections,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "ROLEGATE_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let session_cache = match lookup("ROLEGATE_SESSION_CACHE")
            .unwrap_or_else(|| "memory".to_owned())
            .as_str()
        {
            "memory" => SessionCacheConfig::Memory,
            "redis" => SessionCacheConfig::Redis {
                redis_url: required_non_empty(&lookup, "REDIS_URL")?,
                key_prefix: lookup("SESSION_KEY_PREFIX")
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SESSION_KEY_PREFIX.to_owned()),
            },
            other => {
                return Err(AppError::Validation(format!(
                    "ROLEGATE_SESSION_CACHE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        Ok(Self {
            store,
            session_cache,
        })
    }
}

/// Installs the global `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rolegate_core::AppError;

    use super::{RuntimeConfig, SessionCacheConfig, StoreConfig};

    fn config_from(pairs: &[(&str, &str)]) -> Result<RuntimeConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        RuntimeConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_to_in_memory_adapters() {
        let config = config_from(&[]).unwrap_or_else(|error| panic!("config failed: {error}"));

        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.session_cache, SessionCacheConfig::Memory);
    }

    #[test]
    fn postgres_requires_database_url() {
        let result = config_from(&[("ROLEGATE_STORE", "postgres")]);
        assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("DATABASE_URL")));

        let config = config_from(&[
            ("ROLEGATE_STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/rolegate"),
        ])
        .unwrap_or_else(|error| panic!("config failed: {error}"));
        assert!(matches!(
            config.store,
            StoreConfig::Postgres { max_connections: 10, .. }
        ));
    }

    #[test]
    fn redis_uses_default_key_prefix() {
        let config = config_from(&[
            ("ROLEGATE_SESSION_CACHE", "redis"),
            ("REDIS_URL", "redis://127.0.0.1/"),
        ])
        .unwrap_or_else(|error| panic!("config failed: {error}"));

        assert!(matches!(
            config.session_cache,
            SessionCacheConfig::Redis { ref key_prefix, .. } if key_prefix == "rolegate:session"
        ));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(matches!(
            config_from(&[("ROLEGATE_STORE", "mongo")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            config_from(&[("ROLEGATE_SESSION_CACHE", "disk")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            config_from(&[
                ("ROLEGATE_STORE", "postgres"),
                ("DATABASE_URL", "postgres://localhost/rolegate"),
                ("DATABASE_MAX_CONNECTIONS", "many"),
            ]),
            Err(AppError::Validation(_))
        ));
    }
}
