use async_trait::async_trait;
use rolegate_application::AuditRepository;
use rolegate_core::AppResult;
use rolegate_domain::{AuditEntry, UserId};
use tokio::sync::RwLock;

/// In-memory append-only audit repository.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored entry in insertion order.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_entry(&self, entry: AuditEntry) -> AppResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_entries_for_user(
        &self,
        target_user_id: &UserId,
        limit: usize,
    ) -> AppResult<Vec<AuditEntry>> {
        let entries = self.entries.read().await;

        let mut values: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| &entry.target_user_id == target_user_id)
            .cloned()
            .collect();
        values.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        values.truncate(limit);

        Ok(values)
    }
}
