use std::str::FromStr;

use chrono::{DateTime, Utc};
use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{Role, UserId};

/// Stable audit actions emitted by privileged directory mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user's role is changed.
    RoleChange,
    /// Emitted when a user is deactivated.
    Deactivated,
    /// Emitted when a user is reactivated.
    Reactivated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleChange => "role_change",
            Self::Deactivated => "deactivated",
            Self::Reactivated => "reactivated",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "role_change" => Ok(Self::RoleChange),
            "deactivated" => Ok(Self::Deactivated),
            "reactivated" => Ok(Self::Reactivated),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}

/// Write-once record of a privileged action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Action kind.
    pub action: AuditAction,
    /// User the action was applied to.
    pub target_user_id: UserId,
    /// Administrator who performed the action.
    pub admin_id: UserId,
    /// Time of the action.
    pub timestamp: DateTime<Utc>,
    /// Free-text detail.
    pub details: String,
    /// Previous role, for role changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_role: Option<Role>,
    /// New role, for role changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_role: Option<Role>,
}

impl AuditEntry {
    /// Builds the entry recorded for a role change.
    #[must_use]
    pub fn role_change(
        target_user_id: UserId,
        admin_id: UserId,
        old_role: Role,
        new_role: Role,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action: AuditAction::RoleChange,
            target_user_id,
            admin_id,
            timestamp,
            details: format!("Role changed from {old_role} to {new_role}"),
            old_role: Some(old_role),
            new_role: Some(new_role),
        }
    }

    /// Builds the entry recorded for an activation change.
    ///
    /// Without explicit details the text defaults to `"User <action>"`.
    #[must_use]
    pub fn user_action(
        action: AuditAction,
        target_user_id: UserId,
        admin_id: UserId,
        details: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let details = details
            .filter(|value| !value.trim().is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("User {}", action.as_str()));

        Self {
            action,
            target_user_id,
            admin_id,
            timestamp,
            details,
            old_role: None,
            new_role: None,
        }
    }
}
