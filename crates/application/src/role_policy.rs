//! Permission resolution and role-transition rules.
//!
//! The free functions evaluate against the constant role catalog. Tests that
//! need a hypothetical actor build a [`RolePolicy`] over their own
//! [`PermissionCatalog`].

use std::str::FromStr;

use rolegate_core::AppResult;
use rolegate_domain::{AppRoute, Capability, PermissionSet, Role};

/// Source of the grants held by each role.
pub trait PermissionCatalog: Send + Sync {
    /// Returns the grants for a role.
    fn permissions_for(&self, role: Role) -> &PermissionSet;
}

/// Catalog backed by the constant role table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticRoleCatalog;

impl PermissionCatalog for StaticRoleCatalog {
    fn permissions_for(&self, role: Role) -> &PermissionSet {
        role.permissions()
    }
}

/// Why a role transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenial {
    /// The acting role lacks `canModifyUserRoles`.
    RoleModificationNotGranted {
        /// Role of the requesting actor.
        acting_role: Role,
    },
    /// A non-admin actor tried to assign the admin role.
    AdminEscalation {
        /// Role of the requesting actor.
        acting_role: Role,
    },
}

impl std::fmt::Display for TransitionDenial {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoleModificationNotGranted { acting_role } => {
                write!(formatter, "role {acting_role} cannot modify user roles")
            }
            Self::AdminEscalation { acting_role } => write!(
                formatter,
                "role admin required to assign the admin role, current role: {acting_role}"
            ),
        }
    }
}

/// Outcome of a role transition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// The transition may be persisted.
    Allowed,
    /// The transition must not be persisted.
    Denied(TransitionDenial),
}

impl TransitionDecision {
    /// Returns whether the transition is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Stateless policy evaluator over a permission catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy<C = StaticRoleCatalog> {
    catalog: C,
}

impl RolePolicy<StaticRoleCatalog> {
    /// Returns the policy backed by the constant role table.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            catalog: StaticRoleCatalog,
        }
    }
}

impl<C: PermissionCatalog> RolePolicy<C> {
    /// Creates a policy over a custom catalog.
    #[must_use]
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Returns the grants for a role.
    #[must_use]
    pub fn permissions_for(&self, role: Role) -> &PermissionSet {
        self.catalog.permissions_for(role)
    }

    /// Returns whether the role holds the capability.
    #[must_use]
    pub fn has_permission(&self, role: Role, capability: Capability) -> bool {
        self.permissions_for(role).allows(capability)
    }

    /// Checks a capability given by its string key.
    ///
    /// Unknown keys are a validation error, never a silent `false`.
    pub fn has_named_permission(&self, role: Role, capability_key: &str) -> AppResult<bool> {
        let capability = Capability::from_str(capability_key)?;
        Ok(self.has_permission(role, capability))
    }

    /// Returns whether the role may open the named route.
    ///
    /// Route names outside the protected route table are open to everyone.
    #[must_use]
    pub fn can_access_route(&self, role: Role, route_name: &str) -> bool {
        match AppRoute::from_name(route_name) {
            Some(route) => self
                .permissions_for(role)
                .allows_any(route.required_any_of()),
            None => true,
        }
    }

    /// Decides whether `acting_role` may move a user from `current_role` to
    /// `proposed_role`.
    ///
    /// `current_role` does not influence the decision; demoting an admin is
    /// treated like any other transition.
    #[must_use]
    pub fn evaluate_transition(
        &self,
        _current_role: Role,
        proposed_role: Role,
        acting_role: Role,
    ) -> TransitionDecision {
        if !self.has_permission(acting_role, Capability::ModifyUserRoles) {
            return TransitionDecision::Denied(TransitionDenial::RoleModificationNotGranted {
                acting_role,
            });
        }

        if proposed_role == Role::Admin && acting_role != Role::Admin {
            return TransitionDecision::Denied(TransitionDenial::AdminEscalation { acting_role });
        }

        TransitionDecision::Allowed
    }

    /// Boolean form of [`Self::evaluate_transition`].
    #[must_use]
    pub fn validate_transition(
        &self,
        current_role: Role,
        proposed_role: Role,
        acting_role: Role,
    ) -> bool {
        self.evaluate_transition(current_role, proposed_role, acting_role)
            .is_allowed()
    }
}

const STANDARD: RolePolicy = RolePolicy::standard();

/// Returns the constant grants for a role.
#[must_use]
pub fn permissions_for(role: Role) -> &'static PermissionSet {
    role.permissions()
}

/// Returns whether the role holds the capability.
#[must_use]
pub fn has_permission(role: Role, capability: Capability) -> bool {
    STANDARD.has_permission(role, capability)
}

/// Checks a capability given by its string key; unknown keys are rejected.
pub fn has_named_permission(role: Role, capability_key: &str) -> AppResult<bool> {
    STANDARD.has_named_permission(role, capability_key)
}

/// Returns whether the role may open the named route.
#[must_use]
pub fn can_access_route(role: Role, route_name: &str) -> bool {
    STANDARD.can_access_route(role, route_name)
}

/// Returns whether `acting_role` may change a user's role to `proposed_role`.
#[must_use]
pub fn validate_transition(current_role: Role, proposed_role: Role, acting_role: Role) -> bool {
    STANDARD.validate_transition(current_role, proposed_role, acting_role)
}

#[cfg(test)]
mod tests {
    use rolegate_core::AppError;
    use rolegate_domain::{Capability, PermissionSet, Role};

    use super::{
        PermissionCatalog, RolePolicy, TransitionDecision, TransitionDenial, can_access_route,
        has_named_permission, has_permission, permissions_for, validate_transition,
    };

    /// Catalog in which vendors may modify roles, to isolate the admin rule.
    struct RoleModifyingVendorCatalog {
        vendor: PermissionSet,
    }

    impl RoleModifyingVendorCatalog {
        fn new() -> Self {
            let mut vendor = *Role::Vendor.permissions();
            vendor.can_modify_user_roles = true;
            Self { vendor }
        }
    }

    impl PermissionCatalog for RoleModifyingVendorCatalog {
        fn permissions_for(&self, role: Role) -> &PermissionSet {
            match role {
                Role::Vendor => &self.vendor,
                other => other.permissions(),
            }
        }
    }

    #[test]
    fn every_role_resolves_all_capabilities() {
        for role in Role::all() {
            let permissions = permissions_for(*role);
            for capability in Capability::all() {
                assert_eq!(
                    permissions.allows(*capability),
                    has_permission(*role, *capability)
                );
            }
        }
    }

    #[test]
    fn published_permission_checks() {
        assert!(!has_permission(Role::Customer, Capability::ViewAdminPanel));
        assert!(has_permission(Role::Admin, Capability::ViewAdminPanel));
        assert!(has_permission(Role::Vendor, Capability::CreateProducts));
    }

    #[test]
    fn named_permission_checks_use_capability_keys() {
        assert!(matches!(
            has_named_permission(Role::Admin, "canViewAdminPanel"),
            Ok(true)
        ));
        assert!(matches!(
            has_named_permission(Role::Customer, "canViewAdminPanel"),
            Ok(false)
        ));
    }

    #[test]
    fn unknown_capability_key_fails_loudly() {
        assert!(matches!(
            has_named_permission(Role::Admin, "canViewAdminPanle"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn route_access_follows_route_table() {
        assert!(!can_access_route(Role::Customer, "AdminPanel"));
        assert!(!can_access_route(Role::Vendor, "UserManagement"));
        assert!(can_access_route(Role::Admin, "AdminPanel"));
        assert!(can_access_route(Role::Vendor, "ProductManagement"));
        assert!(can_access_route(Role::Vendor, "VendorDashboard"));
        assert!(!can_access_route(Role::Customer, "VendorDashboard"));
        assert!(can_access_route(Role::Customer, "Chat"));
    }

    #[test]
    fn unknown_routes_are_open() {
        for role in Role::all() {
            assert!(can_access_route(*role, "Home"));
            assert!(can_access_route(*role, ""));
        }
    }

    #[test]
    fn admin_may_change_customer_to_vendor() {
        assert!(validate_transition(Role::Customer, Role::Vendor, Role::Admin));
    }

    #[test]
    fn non_admin_cannot_modify_roles() {
        assert!(!validate_transition(
            Role::Customer,
            Role::Vendor,
            Role::Customer
        ));
        assert!(!validate_transition(Role::Customer, Role::Admin, Role::Vendor));
        assert_eq!(
            RolePolicy::standard().evaluate_transition(Role::Customer, Role::Admin, Role::Vendor),
            TransitionDecision::Denied(TransitionDenial::RoleModificationNotGranted {
                acting_role: Role::Vendor
            })
        );
    }

    #[test]
    fn admin_may_mint_admin() {
        assert!(validate_transition(Role::Customer, Role::Admin, Role::Admin));
    }

    #[test]
    fn admin_escalation_is_blocked_even_with_role_modify_grant() {
        let policy = RolePolicy::new(RoleModifyingVendorCatalog::new());

        assert!(policy.has_permission(Role::Vendor, Capability::ModifyUserRoles));
        assert!(policy.validate_transition(Role::Customer, Role::Vendor, Role::Vendor));
        assert_eq!(
            policy.evaluate_transition(Role::Customer, Role::Admin, Role::Vendor),
            TransitionDecision::Denied(TransitionDenial::AdminEscalation {
                acting_role: Role::Vendor
            })
        );
    }

    // Documents current behavior: the target's current role is not consulted,
    // so demoting an admin needs no extra confirmation.
    #[test]
    fn admin_demotion_is_treated_like_any_transition() {
        assert!(validate_transition(Role::Admin, Role::Customer, Role::Admin));
        assert_eq!(
            validate_transition(Role::Admin, Role::Customer, Role::Admin),
            validate_transition(Role::Customer, Role::Vendor, Role::Admin)
        );
    }

    #[test]
    fn denial_messages_name_roles() {
        let escalation = TransitionDenial::AdminEscalation {
            acting_role: Role::Vendor,
        };
        assert!(escalation.to_string().contains("admin"));
        assert!(escalation.to_string().contains("vendor"));
    }
}
