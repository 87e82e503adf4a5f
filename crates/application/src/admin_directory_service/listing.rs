use rolegate_domain::Role;

use crate::directory_ports::{AdminUserListItem, UserCountFilter, UserListQuery};

use super::*;

const DEFAULT_LIST_LIMIT: usize = 100;
const DEFAULT_ROLE_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

/// Role filter applied to a loaded directory page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleFilter {
    /// Keep every role.
    #[default]
    All,
    /// Keep one role.
    Only(Role),
}

/// Client-side filter over a loaded directory page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Role filter.
    pub role: RoleFilter,
    /// Case-insensitive search over email and names; blank matches all.
    pub search_query: String,
}

/// Directory head counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    /// Sum of the per-role counts.
    pub total_users: u64,
    /// Users with the customer role.
    pub customer_count: u64,
    /// Users with the vendor role.
    pub vendor_count: u64,
    /// Users with the admin role.
    pub admin_count: u64,
    /// Users not deactivated.
    pub active_users: u64,
    /// `total_users - active_users`.
    pub inactive_users: u64,
}

/// Applies a role filter and search query to a loaded page.
#[must_use]
pub fn filter_users(users: &[AdminUserListItem], filter: &UserFilter) -> Vec<AdminUserListItem> {
    let query = filter.search_query.trim().to_lowercase();

    users
        .iter()
        .filter(|user| match filter.role {
            RoleFilter::All => true,
            RoleFilter::Only(role) => user.role == role,
        })
        .filter(|user| {
            query.is_empty()
                || user.email.to_lowercase().contains(&query)
                || user.first_name.to_lowercase().contains(&query)
                || user.last_name.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

impl AdminDirectoryService {
    /// Lists users newest first for administrative users.
    pub async fn list_users(
        &self,
        actor: &Principal,
        limit: Option<usize>,
    ) -> AppResult<Vec<AdminUserListItem>> {
        Self::require_admin_panel(actor)?;
        self.fetch_list(None, limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .await
    }

    /// Lists users holding one role, newest first.
    pub async fn list_users_by_role(
        &self,
        actor: &Principal,
        role: Role,
        limit: Option<usize>,
    ) -> AppResult<Vec<AdminUserListItem>> {
        Self::require_admin_panel(actor)?;
        self.fetch_list(Some(role), limit.unwrap_or(DEFAULT_ROLE_LIST_LIMIT))
            .await
    }

    /// Returns directory head counts.
    pub async fn user_stats(&self, actor: &Principal) -> AppResult<UserStats> {
        Self::require_admin_panel(actor)?;

        let customer_count = self.count(Some(Role::Customer), false).await?;
        let vendor_count = self.count(Some(Role::Vendor), false).await?;
        let admin_count = self.count(Some(Role::Admin), false).await?;
        let active_users = self.count(None, true).await?;
        let total_users = customer_count + vendor_count + admin_count;

        Ok(UserStats {
            total_users,
            customer_count,
            vendor_count,
            admin_count,
            active_users,
            inactive_users: total_users.saturating_sub(active_users),
        })
    }

    async fn fetch_list(
        &self,
        role: Option<Role>,
        limit: usize,
    ) -> AppResult<Vec<AdminUserListItem>> {
        let records = self
            .directory
            .list_users(UserListQuery {
                limit: limit.clamp(1, MAX_LIST_LIMIT),
                role,
            })
            .await?;

        Ok(records.iter().map(UserRecord::to_list_item).collect())
    }

    async fn count(&self, role: Option<Role>, active_only: bool) -> AppResult<u64> {
        self.directory
            .count_users(UserCountFilter { role, active_only })
            .await
    }
}
