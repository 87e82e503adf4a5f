use std::sync::Arc;

use rolegate_application::{
    AdminDirectoryService, AuditRepository, AuthSessionService, PermissionService, SessionCache,
    UserDirectoryRepository,
};
use rolegate_core::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::console_identity_provider::ConsoleIdentityProvider;
use crate::in_memory_audit_repository::InMemoryAuditRepository;
use crate::in_memory_session_cache::InMemorySessionCache;
use crate::in_memory_user_directory::InMemoryUserDirectory;
use crate::postgres_audit_repository::PostgresAuditRepository;
use crate::postgres_user_directory_repository::PostgresUserDirectoryRepository;
use crate::redis_session_cache::RedisSessionCache;
use crate::runtime_config::{RuntimeConfig, SessionCacheConfig, StoreConfig};

/// Application services composed from the configured adapters.
#[derive(Clone)]
pub struct RolegateServices {
    /// Administrative directory workflows.
    pub admin_directory: AdminDirectoryService,
    /// Sign-in and session bootstrap.
    pub auth_session: AuthSessionService,
    /// Authorization checks keyed by user id.
    pub permissions: PermissionService,
}

/// Connects to PostgreSQL and applies the embedded migrations.
pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

/// Opens a Redis client for the configured URL.
pub fn build_redis_client(redis_url: &str) -> AppResult<redis::Client> {
    redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))
}

/// Builds the application services for a runtime configuration.
pub async fn build_services(config: &RuntimeConfig) -> AppResult<RolegateServices> {
    let (directory, audit_repository): (
        Arc<dyn UserDirectoryRepository>,
        Arc<dyn AuditRepository>,
    ) = match &config.store {
        StoreConfig::Memory => {
            info!("using in-memory user directory");
            (
                Arc::new(InMemoryUserDirectory::new()),
                Arc::new(InMemoryAuditRepository::new()),
            )
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = connect_and_migrate(database_url, *max_connections).await?;
            info!(max_connections, "using postgres user directory");
            (
                Arc::new(PostgresUserDirectoryRepository::new(pool.clone())),
                Arc::new(PostgresAuditRepository::new(pool)),
            )
        }
    };

    let session_cache: Arc<dyn SessionCache> = match &config.session_cache {
        SessionCacheConfig::Memory => Arc::new(InMemorySessionCache::new()),
        SessionCacheConfig::Redis {
            redis_url,
            key_prefix,
        } => Arc::new(RedisSessionCache::new(
            build_redis_client(redis_url)?,
            key_prefix.clone(),
        )),
    };

    Ok(RolegateServices {
        admin_directory: AdminDirectoryService::new(directory.clone(), audit_repository),
        auth_session: AuthSessionService::new(
            Arc::new(ConsoleIdentityProvider::new()),
            directory.clone(),
            session_cache,
        ),
        permissions: PermissionService::new(directory),
    })
}
