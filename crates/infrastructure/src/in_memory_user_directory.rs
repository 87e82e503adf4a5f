use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolegate_application::{
    DeactivationRecord, ProfileUpdate, ReactivationRecord, RoleUpdate, UserCountFilter,
    UserDirectoryRepository, UserListQuery, UserRecord,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::UserId;
use tokio::sync::RwLock;

/// In-memory user directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    async fn modify(
        &self,
        user_id: &UserId,
        apply: impl FnOnce(&mut UserRecord),
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl UserDirectoryRepository for InMemoryUserDirectory {
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn create_user(&self, record: UserRecord) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&record.id) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                record.id
            )));
        }

        users.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<UserRecord>> {
        let users = self.users.read().await;

        let mut values: Vec<UserRecord> = users
            .values()
            .filter(|record| query.role.is_none_or(|role| record.role == role))
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        values.truncate(query.limit);

        Ok(values)
    }

    async fn count_users(&self, filter: UserCountFilter) -> AppResult<u64> {
        let users = self.users.read().await;

        let count = users
            .values()
            .filter(|record| filter.role.is_none_or(|role| record.role == role))
            .filter(|record| !filter.active_only || record.is_active)
            .count();

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid user count: {error}")))
    }

    async fn update_role(&self, user_id: &UserId, update: RoleUpdate) -> AppResult<()> {
        self.modify(user_id, |record| {
            record.role = update.role;
            record.updated_at = update.updated_at;
            record.role_history.push(update.history_entry);
        })
        .await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        modified_by: &UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.modify(user_id, |record| {
            update.apply_to(&mut record.profile);
            record.last_modified_by = Some(modified_by.clone());
            record.updated_at = updated_at;
        })
        .await
    }

    async fn deactivate_user(
        &self,
        user_id: &UserId,
        deactivation: DeactivationRecord,
    ) -> AppResult<()> {
        self.modify(user_id, |record| {
            record.is_active = false;
            record.updated_at = deactivation.deactivated_at;
            record.deactivation = Some(deactivation);
        })
        .await
    }

    async fn reactivate_user(
        &self,
        user_id: &UserId,
        reactivation: ReactivationRecord,
    ) -> AppResult<()> {
        self.modify(user_id, |record| {
            record.is_active = true;
            record.deactivation = None;
            record.updated_at = reactivation.reactivated_at;
            record.reactivation = Some(reactivation);
        })
        .await
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<()> {
        self.modify(user_id, |record| record.last_login = Some(at))
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rolegate_application::{
        RoleHistoryEntry, RoleUpdate, UserCountFilter, UserDirectoryRepository, UserListQuery,
        UserRecord,
    };
    use rolegate_core::AppError;
    use rolegate_domain::{EmailAddress, Role, UserId, UserProfile};

    use super::InMemoryUserDirectory;

    fn user_id(value: &str) -> UserId {
        UserId::new(value).unwrap_or_else(|_| panic!("invalid test user id"))
    }

    fn record(id: &str, role: Role, minutes_ago: i64) -> UserRecord {
        UserRecord::registered(
            user_id(id),
            EmailAddress::new(format!("{id}@example.com"))
                .unwrap_or_else(|_| panic!("invalid test email")),
            role,
            UserProfile::named(id, "Tester"),
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let directory = InMemoryUserDirectory::new();

        assert!(directory.create_user(record("a", Role::Customer, 1)).await.is_ok());
        let duplicate = directory.create_user(record("a", Role::Vendor, 1)).await;

        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first_with_role_filter_and_limit() {
        let directory = InMemoryUserDirectory::new();
        for (id, role, age) in [
            ("old", Role::Vendor, 30),
            ("new", Role::Vendor, 1),
            ("mid", Role::Customer, 10),
        ] {
            assert!(directory.create_user(record(id, role, age)).await.is_ok());
        }

        let all = directory
            .list_users(UserListQuery {
                limit: 10,
                role: None,
            })
            .await
            .unwrap_or_else(|error| panic!("list failed: {error}"));
        let ids: Vec<&str> = all.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        let vendors = directory
            .list_users(UserListQuery {
                limit: 1,
                role: Some(Role::Vendor),
            })
            .await
            .unwrap_or_else(|error| panic!("list failed: {error}"));
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].id.as_str(), "new");
    }

    #[tokio::test]
    async fn role_update_appends_history_and_counts_follow() {
        let directory = InMemoryUserDirectory::new();
        assert!(directory.create_user(record("a", Role::Customer, 1)).await.is_ok());
        let now = Utc::now();

        let update = directory
            .update_role(
                &user_id("a"),
                RoleUpdate {
                    role: Role::Vendor,
                    updated_at: now,
                    history_entry: RoleHistoryEntry {
                        role: Role::Vendor,
                        assigned_at: now,
                        assigned_by: user_id("admin"),
                    },
                },
            )
            .await;
        assert!(update.is_ok());

        let stored = directory
            .find_user(&user_id("a"))
            .await
            .unwrap_or_else(|error| panic!("find failed: {error}"))
            .unwrap_or_else(|| panic!("user missing"));
        assert_eq!(stored.role, Role::Vendor);
        assert_eq!(stored.role_history.len(), 1);

        let vendors = directory
            .count_users(UserCountFilter {
                role: Some(Role::Vendor),
                active_only: false,
            })
            .await;
        assert!(matches!(vendors, Ok(1)));
    }

    #[tokio::test]
    async fn writes_to_missing_user_are_not_found() {
        let directory = InMemoryUserDirectory::new();

        let result = directory.record_login(&user_id("ghost"), Utc::now()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
