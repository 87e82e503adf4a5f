//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod permission;
mod role;
mod route;
mod user;

pub use audit::{AuditAction, AuditEntry};
pub use permission::{Capability, PermissionSet};
pub use role::{DEFAULT_ROLE, Role, RoleConfig};
pub use route::AppRoute;
pub use user::{EmailAddress, GeoPoint, Principal, UserId, UserProfile};
