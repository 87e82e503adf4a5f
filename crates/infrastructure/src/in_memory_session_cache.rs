use std::collections::HashMap;

use async_trait::async_trait;
use rolegate_application::SessionCache;
use rolegate_core::AppResult;
use tokio::sync::RwLock;

/// Process-local session cache.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
