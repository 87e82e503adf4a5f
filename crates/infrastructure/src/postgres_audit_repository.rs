use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rolegate_application::AuditRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AuditAction, AuditEntry, Role, UserId};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditEntryRow {
    action: String,
    target_user_id: String,
    admin_id: String,
    details: String,
    old_role: Option<String>,
    new_role: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            action: row.action.parse::<AuditAction>()?,
            target_user_id: UserId::new(row.target_user_id)?,
            admin_id: UserId::new(row.admin_id)?,
            timestamp: row.recorded_at,
            details: row.details,
            old_role: row
                .old_role
                .as_deref()
                .map(Role::from_transport)
                .transpose()?,
            new_role: row
                .new_role
                .as_deref()
                .map(Role::from_transport)
                .transpose()?,
        })
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_entry(&self, entry: AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_audit_entries (
                id,
                action,
                target_user_id,
                admin_id,
                details,
                old_role,
                new_role,
                recorded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.action.as_str())
        .bind(entry.target_user_id.as_str())
        .bind(entry.admin_id.as_str())
        .bind(entry.details)
        .bind(entry.old_role.map(|role| role.as_str()))
        .bind(entry.new_role.map(|role| role.as_str()))
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(())
    }

    async fn list_entries_for_user(
        &self,
        target_user_id: &UserId,
        limit: usize,
    ) -> AppResult<Vec<AuditEntry>> {
        let limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid audit page size: {error}")))?;

        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT action, target_user_id, admin_id, details, old_role, new_role, recorded_at
            FROM admin_audit_entries
            WHERE target_user_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(target_user_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit entries: {error}")))?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
