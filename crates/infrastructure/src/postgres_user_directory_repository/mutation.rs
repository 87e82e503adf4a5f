use super::*;

impl PostgresUserDirectoryRepository {
    pub(super) async fn create_user_impl(&self, record: UserRecord) -> AppResult<()> {
        let role_history = role_history_json(&record.role_history)?;
        let location = record.profile.location;

        sqlx::query(
            r#"
            INSERT INTO directory_users (
                id, email, role, first_name, last_name, phone, latitude, longitude,
                is_active, role_history, last_login, created_at, updated_at
            )
            VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.email.as_str())
        .bind(record.role.as_str())
        .bind(record.profile.first_name)
        .bind(record.profile.last_name)
        .bind(record.profile.phone)
        .bind(location.map(|point| point.latitude))
        .bind(location.map(|point| point.longitude))
        .bind(record.is_active)
        .bind(role_history)
        .bind(record.last_login)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| user_conflict_or_internal(error, "create user"))?;

        Ok(())
    }

    pub(super) async fn update_role_impl(
        &self,
        user_id: &UserId,
        update: RoleUpdate,
    ) -> AppResult<()> {
        let history_entry = role_history_json(std::slice::from_ref(&update.history_entry))?;

        let result = sqlx::query(
            r#"
            UPDATE directory_users
            SET role = $2,
                updated_at = $3,
                role_history = role_history || $4::JSONB
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(update.role.as_str())
        .bind(update.updated_at)
        .bind(history_entry)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user role: {error}")))?;

        require_affected(result.rows_affected(), user_id)
    }

    pub(super) async fn update_profile_impl(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
        modified_by: &UserId,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE directory_users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                last_modified_by = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.phone)
        .bind(update.location.map(|point| point.latitude))
        .bind(update.location.map(|point| point.longitude))
        .bind(modified_by.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user profile: {error}")))?;

        require_affected(result.rows_affected(), user_id)
    }

    pub(super) async fn deactivate_user_impl(
        &self,
        user_id: &UserId,
        deactivation: DeactivationRecord,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE directory_users
            SET is_active = FALSE,
                deactivated_at = $2,
                deactivated_by = $3,
                deactivation_reason = $4,
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(deactivation.deactivated_at)
        .bind(deactivation.deactivated_by.as_str())
        .bind(deactivation.reason)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to deactivate user: {error}")))?;

        require_affected(result.rows_affected(), user_id)
    }

    pub(super) async fn reactivate_user_impl(
        &self,
        user_id: &UserId,
        reactivation: ReactivationRecord,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE directory_users
            SET is_active = TRUE,
                deactivated_at = NULL,
                deactivated_by = NULL,
                deactivation_reason = NULL,
                reactivated_at = $2,
                reactivated_by = $3,
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(reactivation.reactivated_at)
        .bind(reactivation.reactivated_by.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to reactivate user: {error}")))?;

        require_affected(result.rows_affected(), user_id)
    }

    pub(super) async fn record_login_impl(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE directory_users
            SET last_login = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record user login: {error}")))?;

        require_affected(result.rows_affected(), user_id)
    }
}

fn role_history_json(entries: &[RoleHistoryEntry]) -> AppResult<serde_json::Value> {
    serde_json::to_value(entries)
        .map_err(|error| AppError::Internal(format!("failed to serialize role history: {error}")))
}
