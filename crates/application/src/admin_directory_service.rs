use std::sync::Arc;

use tracing::warn;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AuditEntry, Capability, Principal, UserId};

use crate::access_guard::require_capability;
use crate::directory_ports::{AuditRepository, UserDirectoryRepository, UserRecord};

mod activation;
mod listing;
mod profile;
mod roles;


pub use activation::DEFAULT_DEACTIVATION_REASON;
pub use listing::{RoleFilter, UserFilter, UserStats, filter_users};
pub use roles::RoleChange;

/// Result of the best-effort audit write that follows a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The entry was persisted.
    Recorded,
    /// The entry could not be persisted; the mutation still stands.
    Failed(String),
}

/// Side channel receiving every audit write outcome.
pub trait AuditObserver: Send + Sync {
    /// Called once per attempted audit write.
    fn on_audit_outcome(&self, entry: &AuditEntry, outcome: &AuditOutcome);
}

/// Observer that reports failed audit writes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditObserver;

impl AuditObserver for TracingAuditObserver {
    fn on_audit_outcome(&self, entry: &AuditEntry, outcome: &AuditOutcome) {
        if let AuditOutcome::Failed(error) = outcome {
            warn!(
                action = entry.action.as_str(),
                target_user_id = %entry.target_user_id,
                admin_id = %entry.admin_id,
                error = %error,
                "failed to append audit entry"
            );
        }
    }
}

/// Application service for administrative user directory workflows.
#[derive(Clone)]
pub struct AdminDirectoryService {
    directory: Arc<dyn UserDirectoryRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_observer: Arc<dyn AuditObserver>,
}

impl AdminDirectoryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectoryRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            directory,
            audit_repository,
            audit_observer: Arc::new(TracingAuditObserver),
        }
    }

    /// Replaces the observer notified after each audit write.
    #[must_use]
    pub fn with_audit_observer(mut self, audit_observer: Arc<dyn AuditObserver>) -> Self {
        self.audit_observer = audit_observer;
        self
    }

    async fn load_target(&self, user_id: &UserId) -> AppResult<UserRecord> {
        self.directory
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    fn require_admin_panel(actor: &Principal) -> AppResult<()> {
        require_capability(actor, Capability::ViewAdminPanel)
    }

    /// Writes the audit entry after the primary mutation has succeeded.
    ///
    /// The outcome goes to the observer only and never reaches the caller.
    async fn record_audit(&self, entry: AuditEntry) {
        let outcome = match self.audit_repository.append_entry(entry.clone()).await {
            Ok(()) => AuditOutcome::Recorded,
            Err(error) => AuditOutcome::Failed(error.to_string()),
        };

        self.audit_observer.on_audit_outcome(&entry, &outcome);
    }
}
