//! Application services and ports.

#![forbid(unsafe_code)]

mod access_guard;
mod admin_directory_service;
mod auth_session_service;
mod directory_ports;
mod permission_service;
mod role_policy;
mod session_ports;

#[cfg(test)]
mod test_support;

pub use access_guard::{
    AccessDecision, AccessRequirements, AuthState, DenialReason, evaluate_access,
    require_capability,
};
pub use admin_directory_service::{
    AdminDirectoryService, AuditObserver, AuditOutcome, DEFAULT_DEACTIVATION_REASON, RoleChange,
    RoleFilter, TracingAuditObserver, UserFilter, UserStats, filter_users,
};
pub use auth_session_service::{AuthSessionService, PENDING_REGISTRATION_KEY, SESSION_KEY};
pub use directory_ports::{
    AdminUserListItem, AuditRepository, DeactivationRecord, ProfileUpdate, ReactivationRecord,
    RoleHistoryEntry, RoleUpdate, UserCountFilter, UserDirectoryRepository, UserListQuery,
    UserRecord,
};
pub use permission_service::{
    PermissionCheck, PermissionDenial, PermissionService, access_denied_message,
};
pub use role_policy::{
    PermissionCatalog, RolePolicy, StaticRoleCatalog, TransitionDecision, TransitionDenial,
    can_access_route, has_named_permission, has_permission, permissions_for, validate_transition,
};
pub use session_ports::{IdentityProvider, RegistrationInput, SessionCache, SessionData};
