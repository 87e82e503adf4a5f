//! PostgreSQL-backed user directory repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use rolegate_application::{
    DeactivationRecord, ProfileUpdate, ReactivationRecord, RoleHistoryEntry, RoleUpdate,
    UserCountFilter, UserDirectoryRepository, UserListQuery, UserRecord,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EmailAddress, GeoPoint, Role, UserId, UserProfile};

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserDirectoryRepository {
    pool: PgPool,
}

impl PostgresUserDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    id, email, role, first_name, last_name, phone, latitude, longitude,
    is_active, deactivated_at, deactivated_by, deactivation_reason,
    reactivated_at, reactivated_by, role_history, last_login, last_modified_by,
    created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    role: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: bool,
    deactivated_at: Option<DateTime<Utc>>,
    deactivated_by: Option<String>,
    deactivation_reason: Option<String>,
    reactivated_at: Option<DateTime<Utc>>,
    reactivated_by: Option<String>,
    role_history: serde_json::Value,
    last_login: Option<DateTime<Utc>>,
    last_modified_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let deactivation = match (row.deactivated_at, row.deactivated_by) {
            (Some(deactivated_at), Some(deactivated_by)) => Some(DeactivationRecord {
                deactivated_at,
                deactivated_by: UserId::new(deactivated_by)?,
                reason: row.deactivation_reason.unwrap_or_default(),
            }),
            _ => None,
        };

        let reactivation = match (row.reactivated_at, row.reactivated_by) {
            (Some(reactivated_at), Some(reactivated_by)) => Some(ReactivationRecord {
                reactivated_at,
                reactivated_by: UserId::new(reactivated_by)?,
            }),
            _ => None,
        };

        let role_history: Vec<RoleHistoryEntry> = serde_json::from_value(row.role_history)
            .map_err(|error| {
                AppError::Internal(format!(
                    "invalid role history stored for user '{}': {error}",
                    row.id
                ))
            })?;

        Ok(Self {
            id: UserId::new(row.id)?,
            email: EmailAddress::new(row.email)?,
            role: Role::from_transport(row.role.as_str())?,
            profile: UserProfile {
                first_name: row.first_name,
                last_name: row.last_name,
                phone: row.phone,
                location,
            },
            is_active: row.is_active,
            deactivation,
            reactivation,
            role_history,
            last_login: row.last_login,
            last_modified_by: row.last_modified_by.map(UserId::new).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

mod lookup;
mod mutation;


#[async_trait]
impl UserDirectoryRepository for PostgresUserDirectoryRepository {
    async fn find_user(&self, user_id: &UserId) -> AppResult<Option<UserRecord>> {
        self.find_user_impl(user_id).await
    }

    async fn create_user(&self, record: UserRecord) -> AppResult<()> {
        self.create_user_impl(record).await
    }

    async fn list_users(&self, query: UserListQuery) -> AppResult<Vec<UserRecord>> {
        self.list_users_impl(query).await
    }

    async fn count_users(&self, filter: UserCountFilter) -> AppResult<u64> {
        self.count_users_impl(filter).await
    }

    async fn update_role(&self, user_id: &UserId, update: RoleUpdate) -> AppResult<()> {
        self.update_role_impl(user_id, update).await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        modified_by: &UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.update_profile_impl(user_id, update, modified_by, updated_at)
            .await
    }

    async fn deactivate_user(
        &self,
        user_id: &UserId,
        deactivation: DeactivationRecord,
    ) -> AppResult<()> {
        self.deactivate_user_impl(user_id, deactivation).await
    }

    async fn reactivate_user(
        &self,
        user_id: &UserId,
        reactivation: ReactivationRecord,
    ) -> AppResult<()> {
        self.reactivate_user_impl(user_id, reactivation).await
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AppResult<()> {
        self.record_login_impl(user_id, at).await
    }
}

fn user_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("a user with this id already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

fn require_affected(rows_affected: u64, user_id: &UserId) -> AppResult<()> {
    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "user '{user_id}' does not exist"
        )));
    }

    Ok(())
}
