use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, IdentityClaims};
use rolegate_domain::{AuditEntry, EmailAddress, Principal, Role, UserId, UserProfile};

use crate::admin_directory_service::{AuditObserver, AuditOutcome};
use crate::directory_ports::{
    AuditRepository, DeactivationRecord, ProfileUpdate, ReactivationRecord, RoleUpdate,
    UserCountFilter, UserDirectoryRepository, UserListQuery, UserRecord,
};
use crate::session_ports::{IdentityProvider, SessionCache};

pub(crate) fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("invalid test user id"))
}

pub(crate) fn record(id: &str, role: Role, minutes_ago: i64) -> UserRecord {
    UserRecord::registered(
        user_id(id),
        EmailAddress::new(format!("{id}@example.com")).unwrap_or_else(|_| panic!("test email")),
        role,
        UserProfile::named(format!("{id}-first"), format!("{id}-last")),
        Utc::now() - Duration::minutes(minutes_ago),
    )
}

pub(crate) fn principal(id: &str, role: Role) -> Principal {
    record(id, role, 0).to_principal()
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub(crate) users: Mutex<HashMap<UserId, UserRecord>>,
    pub(crate) role_updates: Mutex<Vec<(UserId, RoleUpdate)>>,
    pub(crate) fail_reads: bool,
    pub(crate) fail_writes: bool,
}

impl FakeDirectory {
    pub(crate) fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: Mutex::new(
                users
                    .into_iter()
                    .map(|record| (record.id.clone(), record))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub(crate) async fn user(&self, id: &str) -> Option<UserRecord> {
        self.users.lock().await.get(&user_id(id)).cloned()
    }

    fn check_readable(&self) -> AppResult<()> {
        if self.fail_reads {
            return Err(AppError::Internal("store unreachable".to_owned()));
        }
        Ok(())
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Internal("store unreachable".to_owned()));
        }
        Ok(())
    }
}

fn missing(user_id: &UserId) -> AppError {
    AppError::NotFound(format!("user '{user_id}' does not exist"))
}

#[async_trait]
impl UserDirectoryRepository for FakeDirectory {
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<UserRecord>> {
        self.check_readable()?;
        Ok(self.users.lock().await.get(user_id).cloned())
    }

    async fn create_user(&self, record: UserRecord) -> AppResult<()> {
        self.check_writable()?;
        let mut users = self.users.lock().await;
        if users.contains_key(&record.id) {
            return Err(AppError::Conflict(format!("user '{}' exists", record.id)));
        }
        users.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<UserRecord>> {
        let users = self.users.lock().await;
        let mut values: Vec<UserRecord> = users
            .values()
            .filter(|record| query.role.is_none_or(|role| record.role == role))
            .cloned()
            .collect();
        values.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        values.truncate(query.limit);
        Ok(values)
    }

    async fn count_users(&self, filter: UserCountFilter) -> AppResult<u64> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .filter(|record| filter.role.is_none_or(|role| record.role == role))
            .filter(|record| !filter.active_only || record.is_active)
            .count() as u64)
    }

    async fn update_role(&self, user_id: &UserId, update: RoleUpdate) -> AppResult<()> {
        self.check_writable()?;
        self.role_updates
            .lock()
            .await
            .push((user_id.clone(), update.clone()));
        let mut users = self.users.lock().await;
        let record = users.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        record.role = update.role;
        record.updated_at = update.updated_at;
        record.role_history.push(update.history_entry);
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        modified_by: &UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut users = self.users.lock().await;
        let record = users.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        update.apply_to(&mut record.profile);
        record.last_modified_by = Some(modified_by.clone());
        record.updated_at = updated_at;
        Ok(())
    }

    async fn deactivate_user(
        &self,
        user_id: &UserId,
        deactivation: DeactivationRecord,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut users = self.users.lock().await;
        let record = users.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        record.is_active = false;
        record.updated_at = deactivation.deactivated_at;
        record.deactivation = Some(deactivation);
        Ok(())
    }

    async fn reactivate_user(
        &self,
        user_id: &UserId,
        reactivation: ReactivationRecord,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut users = self.users.lock().await;
        let record = users.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        record.is_active = true;
        record.deactivation = None;
        record.updated_at = reactivation.reactivated_at;
        record.reactivation = Some(reactivation);
        Ok(())
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let record = users.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        record.last_login = Some(at);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) entries: Mutex<Vec<AuditEntry>>,
    pub(crate) fail: bool,
}

impl FakeAuditRepository {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_entry(&self, entry: AuditEntry) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("audit collection unavailable".to_owned()));
        }
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list_entries_for_user(
        &self,
        target_user_id: &UserId,
        limit: usize,
    ) -> AppResult<Vec<AuditEntry>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| &entry.target_user_id == target_user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct RecordingAuditObserver {
    pub(crate) outcomes: std::sync::Mutex<Vec<AuditOutcome>>,
}

impl AuditObserver for RecordingAuditObserver {
    fn on_audit_outcome(&self, _entry: &AuditEntry, outcome: &AuditOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome.clone());
        }
    }
}

/// Identity provider accepting one fixed code and deriving uids from emails.
pub(crate) struct FakeIdentityProvider {
    pub(crate) code: String,
    pub(crate) sent_to: Mutex<Vec<String>>,
}

impl FakeIdentityProvider {
    pub(crate) fn accepting(code: &str) -> Self {
        Self {
            code: code.to_owned(),
            sent_to: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn uid_for(email: &str) -> String {
        format!("uid-{}", email.split('@').next().unwrap_or_default())
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn send_code(&self, email: &EmailAddress) -> AppResult<()> {
        self.sent_to.lock().await.push(email.as_str().to_owned());
        Ok(())
    }

    async fn verify_code(&self, email: &EmailAddress, code: &str) -> AppResult<IdentityClaims> {
        if code != self.code {
            return Err(AppError::Unauthorized("invalid verification code".to_owned()));
        }
        Ok(IdentityClaims::new(
            Self::uid_for(email.as_str()),
            Some(email.as_str().to_owned()),
        ))
    }
}

#[derive(Default)]
pub(crate) struct FakeSessionCache {
    pub(crate) values: Mutex<HashMap<String, String>>,
    pub(crate) fail_reads: bool,
    pub(crate) fail_writes: bool,
}

#[async_trait]
impl SessionCache for FakeSessionCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads {
            return Err(AppError::Internal("session cache unreachable".to_owned()));
        }
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Internal("session cache unreachable".to_owned()));
        }
        self.values
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

pub(crate) fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
