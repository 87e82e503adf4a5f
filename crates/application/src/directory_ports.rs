use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    AuditEntry, EmailAddress, GeoPoint, Principal, Role, UserId, UserProfile,
};

/// One append-only entry of a user's role history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleHistoryEntry {
    /// Role that was assigned.
    pub role: Role,
    /// Assignment time.
    pub assigned_at: DateTime<Utc>,
    /// Subject that assigned the role.
    pub assigned_by: UserId,
}

/// Deactivation metadata stored on a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivationRecord {
    /// Deactivation time.
    pub deactivated_at: DateTime<Utc>,
    /// Administrator who deactivated the user.
    pub deactivated_by: UserId,
    /// Stored reason.
    pub reason: String,
}

/// Reactivation metadata stored on a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactivationRecord {
    /// Reactivation time.
    pub reactivated_at: DateTime<Utc>,
    /// Administrator who reactivated the user.
    pub reactivated_by: UserId,
}

/// User document as persisted by the directory store.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Stable user id.
    pub id: UserId,
    /// Login email.
    pub email: EmailAddress,
    /// Current role.
    pub role: Role,
    /// Profile fields.
    pub profile: UserProfile,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Present while the user is deactivated.
    pub deactivation: Option<DeactivationRecord>,
    /// Last reactivation, if any.
    pub reactivation: Option<ReactivationRecord>,
    /// Append-only role assignments.
    pub role_history: Vec<RoleHistoryEntry>,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// Administrator who last edited the profile.
    pub last_modified_by: Option<UserId>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last record update time.
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates an active record for a freshly registered user.
    #[must_use]
    pub fn registered(
        id: UserId,
        email: EmailAddress,
        role: Role,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role,
            profile,
            is_active: true,
            deactivation: None,
            reactivation: None,
            role_history: Vec::new(),
            last_login: None,
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the principal snapshot for this record.
    #[must_use]
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            profile: self.profile.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the administrative list projection for this record.
    #[must_use]
    pub fn to_list_item(&self) -> AdminUserListItem {
        AdminUserListItem {
            id: self.id.clone(),
            email: self.email.as_str().to_owned(),
            role: self.role,
            first_name: self.profile.first_name.clone(),
            last_name: self.profile.last_name.clone(),
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

/// Projection of a user record for administrative listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserListItem {
    /// User id.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Current role.
    pub role: Role,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields written by a role change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdate {
    /// New role.
    pub role: Role,
    /// Update time.
    pub updated_at: DateTime<Utc>,
    /// Entry appended to the role history.
    pub history_entry: RoleHistoryEntry,
}

/// Partial profile edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New location.
    pub location: Option<GeoPoint>,
}

impl ProfileUpdate {
    /// Rejects blank names and empty edits.
    pub fn validate(&self) -> AppResult<()> {
        if self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
        {
            return Err(AppError::Validation(
                "profile update must change at least one field".to_owned(),
            ));
        }

        if let Some(first_name) = &self.first_name
            && first_name.trim().is_empty()
        {
            return Err(AppError::Validation("first name is required".to_owned()));
        }

        if let Some(last_name) = &self.last_name
            && last_name.trim().is_empty()
        {
            return Err(AppError::Validation("last name is required".to_owned()));
        }

        Ok(())
    }

    /// Applies the edit to a profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(first_name) = &self.first_name {
            profile.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            profile.last_name = last_name.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(location) = self.location {
            profile.location = Some(location);
        }
    }
}

/// Query parameters for directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Optional role equality filter.
    pub role: Option<Role>,
}

/// Filter for directory counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCountFilter {
    /// Optional role equality filter.
    pub role: Option<Role>,
    /// Count only active users.
    pub active_only: bool,
}

/// Repository port for user records.
///
/// Writes are plain last-writer-wins updates; no version checks are made.
#[async_trait]
pub trait UserDirectoryRepository: Send + Sync {
    /// Finds one user record.
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<UserRecord>>;

    /// Inserts a new user record; fails with `Conflict` when the id exists.
    async fn create_user(&self, record: UserRecord) -> AppResult<()>;

    /// Lists user records, newest first.
    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<UserRecord>>;

    /// Counts user records matching the filter.
    async fn count_users(&self, filter: UserCountFilter) -> AppResult<u64>;

    /// Writes a new role and appends to the role history.
    async fn update_role(&self, user_id: &UserId, update: RoleUpdate) -> AppResult<()>;

    /// Applies a profile edit.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        modified_by: &UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Marks the user inactive and stores deactivation metadata.
    async fn deactivate_user(
        &self,
        user_id: &UserId,
        deactivation: DeactivationRecord,
    ) -> AppResult<()>;

    /// Marks the user active and clears deactivation metadata.
    async fn reactivate_user(
        &self,
        user_id: &UserId,
        reactivation: ReactivationRecord,
    ) -> AppResult<()>;

    /// Stores the time of a successful sign-in.
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<()>;
}

/// Port for persisting append-only audit entries.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit entry.
    async fn append_entry(&self, entry: AuditEntry) -> AppResult<()>;

    /// Lists entries for a target user, newest first.
    async fn list_entries_for_user(
        &self,
        target_user_id: &UserId,
        limit: usize,
    ) -> AppResult<Vec<AuditEntry>>;
}
