//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_identity_provider;
mod in_memory_audit_repository;
mod in_memory_session_cache;
mod in_memory_user_directory;
mod postgres_audit_repository;
mod postgres_user_directory_repository;
mod redis_session_cache;
mod runtime_config;
mod service_builder;

pub use console_identity_provider::ConsoleIdentityProvider;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_session_cache::InMemorySessionCache;
pub use in_memory_user_directory::InMemoryUserDirectory;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_user_directory_repository::PostgresUserDirectoryRepository;
pub use redis_session_cache::RedisSessionCache;
pub use runtime_config::{RuntimeConfig, SessionCacheConfig, StoreConfig, init_tracing};
pub use service_builder::{
    RolegateServices, build_redis_client, build_services, connect_and_migrate,
};
