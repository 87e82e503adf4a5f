//! Redis-backed session cache.

use async_trait::async_trait;
use redis::AsyncCommands;
use rolegate_application::SessionCache;
use rolegate_core::{AppError, AppResult};

/// Redis implementation of the session cache port.
#[derive(Clone)]
pub struct RedisSessionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSessionCache {
    /// Creates a cache with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut connection = self.connection().await?;

        connection
            .get::<_, Option<String>>(self.key_for(key))
            .await
            .map_err(|error| AppError::Internal(format!("failed to read redis session key: {error}")))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;

        connection
            .set::<_, _, ()>(self.key_for(key), value)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write redis session key: {error}"))
            })
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;

        connection
            .del::<_, ()>(self.key_for(key))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete redis session key: {error}"))
            })
    }
}
