use chrono::Utc;

use crate::directory_ports::ProfileUpdate;

use super::*;

const MAX_AUDIT_PAGE: usize = 200;

impl AdminDirectoryService {
    /// Edits another user's profile on behalf of an administrator.
    pub async fn update_profile(
        &self,
        target_user_id: &UserId,
        update: ProfileUpdate,
        actor: &Principal,
    ) -> AppResult<()> {
        Self::require_admin_panel(actor)?;
        update.validate()?;

        self.directory
            .update_profile(target_user_id, update, &actor.id, Utc::now())
            .await
    }

    /// Returns the audit trail recorded for one user, newest first.
    pub async fn list_audit_entries(
        &self,
        target_user_id: &UserId,
        actor: &Principal,
        limit: usize,
    ) -> AppResult<Vec<AuditEntry>> {
        Self::require_admin_panel(actor)?;

        self.audit_repository
            .list_entries_for_user(target_user_id, limit.clamp(1, MAX_AUDIT_PAGE))
            .await
    }
}
