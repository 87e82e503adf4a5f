use super::*;

impl PostgresUserDirectoryRepository {
    pub(super) async fn find_user_impl(&self, user_id: &UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM directory_users WHERE id = $1 LIMIT 1"
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn list_users_impl(&self, query: UserListQuery) -> AppResult<Vec<UserRecord>> {
        let limit = i64::try_from(query.limit)
            .map_err(|error| AppError::Validation(format!("invalid list limit: {error}")))?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM directory_users
            WHERE ($1::TEXT IS NULL OR role = $1)
            ORDER BY created_at DESC, id ASC
            LIMIT $2
            "#
        ))
        .bind(query.role.map(|role| role.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }

    pub(super) async fn count_users_impl(&self, filter: UserCountFilter) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM directory_users
            WHERE ($1::TEXT IS NULL OR role = $1)
              AND ($2 = FALSE OR is_active)
            "#,
        )
        .bind(filter.role.map(|role| role.as_str()))
        .bind(filter.active_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count users: {error}")))?;

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid user count: {error}")))
    }
}
