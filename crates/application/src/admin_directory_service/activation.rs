use chrono::Utc;
use tracing::info;

use rolegate_domain::AuditAction;

use crate::directory_ports::{DeactivationRecord, ReactivationRecord};

use super::*;

/// Reason stored when an administrator gives none.
pub const DEFAULT_DEACTIVATION_REASON: &str = "No reason provided";

impl AdminDirectoryService {
    /// Deactivates a user and emits a `deactivated` audit entry.
    pub async fn deactivate(
        &self,
        target_user_id: &UserId,
        actor: &Principal,
        reason: Option<&str>,
    ) -> AppResult<()> {
        Self::require_admin_panel(actor)?;

        let supplied_reason = reason
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let deactivated_at = Utc::now();

        self.directory
            .deactivate_user(
                target_user_id,
                DeactivationRecord {
                    deactivated_at,
                    deactivated_by: actor.id.clone(),
                    reason: supplied_reason
                        .unwrap_or(DEFAULT_DEACTIVATION_REASON)
                        .to_owned(),
                },
            )
            .await?;

        info!(target_user_id = %target_user_id, admin_id = %actor.id, "user deactivated");

        self.record_audit(AuditEntry::user_action(
            AuditAction::Deactivated,
            target_user_id.clone(),
            actor.id.clone(),
            supplied_reason,
            deactivated_at,
        ))
        .await;

        Ok(())
    }

    /// Reactivates a user and emits a `reactivated` audit entry.
    pub async fn reactivate(&self, target_user_id: &UserId, actor: &Principal) -> AppResult<()> {
        Self::require_admin_panel(actor)?;

        let reactivated_at = Utc::now();
        self.directory
            .reactivate_user(
                target_user_id,
                ReactivationRecord {
                    reactivated_at,
                    reactivated_by: actor.id.clone(),
                },
            )
            .await?;

        info!(target_user_id = %target_user_id, admin_id = %actor.id, "user reactivated");

        self.record_audit(AuditEntry::user_action(
            AuditAction::Reactivated,
            target_user_id.clone(),
            actor.id.clone(),
            None,
            reactivated_at,
        ))
        .await;

        Ok(())
    }
}
