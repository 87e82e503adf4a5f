use chrono::{DateTime, Utc};
use tracing::info;

use rolegate_domain::Role;

use crate::directory_ports::{RoleHistoryEntry, RoleUpdate};
use crate::role_policy::{RolePolicy, TransitionDecision};

use super::*;

/// Summary of a persisted role change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    /// User whose role changed.
    pub user_id: UserId,
    /// Role before the change.
    pub old_role: Role,
    /// Role after the change.
    pub new_role: Role,
    /// Time the change was written.
    pub changed_at: DateTime<Utc>,
}

impl AdminDirectoryService {
    /// Changes a user's role and emits a `role_change` audit entry.
    ///
    /// Reads the current role, validates the transition for the actor's
    /// role, then writes. A denied transition performs no write. Concurrent
    /// changes on the same user are not detected; the last write wins.
    pub async fn change_role(
        &self,
        target_user_id: &UserId,
        new_role: Role,
        actor: &Principal,
    ) -> AppResult<RoleChange> {
        let target = self.load_target(target_user_id).await?;
        let old_role = target.role;

        if let TransitionDecision::Denied(denial) =
            RolePolicy::standard().evaluate_transition(old_role, new_role, actor.role)
        {
            return Err(AppError::Forbidden(format!(
                "insufficient permissions for role change: {denial}"
            )));
        }

        let changed_at = Utc::now();
        self.directory
            .update_role(
                target_user_id,
                RoleUpdate {
                    role: new_role,
                    updated_at: changed_at,
                    history_entry: RoleHistoryEntry {
                        role: new_role,
                        assigned_at: changed_at,
                        assigned_by: actor.id.clone(),
                    },
                },
            )
            .await?;

        info!(
            target_user_id = %target_user_id,
            admin_id = %actor.id,
            old_role = old_role.as_str(),
            new_role = new_role.as_str(),
            "user role changed"
        );

        self.record_audit(AuditEntry::role_change(
            target_user_id.clone(),
            actor.id.clone(),
            old_role,
            new_role,
            changed_at,
        ))
        .await;

        Ok(RoleChange {
            user_id: target_user_id.clone(),
            old_role,
            new_role,
            changed_at,
        })
    }
}
