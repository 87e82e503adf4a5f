//! Allow/deny decisions for screens and operations.

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Capability, Principal, Role};

use crate::role_policy::{PermissionCatalog, RolePolicy};

/// Authentication status as observed by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    loading: bool,
    principal: Option<Principal>,
}

impl AuthState {
    /// Creates a state from its raw parts.
    #[must_use]
    pub fn new(loading: bool, principal: Option<Principal>) -> Self {
        Self { loading, principal }
    }

    /// Authentication has not resolved yet.
    #[must_use]
    pub fn loading() -> Self {
        Self::new(true, None)
    }

    /// Nobody is signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(false, None)
    }

    /// A principal is signed in.
    #[must_use]
    pub fn authenticated(principal: Principal) -> Self {
        Self::new(false, Some(principal))
    }

    /// Returns whether authentication is still resolving.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns whether a principal is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Returns the signed-in principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Requirements a principal must satisfy to pass the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirements {
    required_role: Option<Role>,
    allowed_roles: Option<Vec<Role>>,
    route_name: Option<String>,
    required_capability: Option<Capability>,
}

impl AccessRequirements {
    /// No requirements: any authenticated principal passes.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Requires exactly this role.
    #[must_use]
    pub fn require_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    /// Requires one of these roles.
    #[must_use]
    pub fn allow_roles(mut self, roles: impl Into<Vec<Role>>) -> Self {
        self.allowed_roles = Some(roles.into());
        self
    }

    /// Requires access to the named route.
    #[must_use]
    pub fn route(mut self, route_name: impl Into<String>) -> Self {
        self.route_name = Some(route_name.into());
        self
    }

    /// Requires a specific capability.
    #[must_use]
    pub fn require_capability(mut self, capability: Capability) -> Self {
        self.required_capability = Some(capability);
        self
    }

    /// Returns whether no requirement is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required_role.is_none()
            && self.allowed_roles.is_none()
            && self.route_name.is_none()
            && self.required_capability.is_none()
    }
}

/// Reason attached to a refused access decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// No principal is signed in.
    AuthenticationRequired,
    /// The principal does not hold the required role.
    RoleRequired(Role),
    /// The principal's role is outside the allowed set.
    InsufficientPermissions,
    /// The route table refuses the principal's role.
    RouteNotAccessible(String),
    /// The principal's role lacks the capability.
    CapabilityRequired(Capability),
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => formatter.write_str("authentication required"),
            Self::RoleRequired(role) => write!(formatter, "role {role} required"),
            Self::InsufficientPermissions => formatter.write_str("insufficient permissions"),
            Self::RouteNotAccessible(_) => formatter.write_str("route not accessible"),
            Self::CapabilityRequired(capability) => {
                write!(formatter, "permission {capability} required")
            }
        }
    }
}

/// Result of evaluating the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Authentication is unresolved; evaluate again once it settles.
    Loading,
    /// No principal is present; requirement checks were skipped.
    Unauthenticated,
    /// The principal failed a requirement.
    Denied(DenialReason),
    /// Access is granted.
    Allowed,
}

impl AccessDecision {
    /// Returns whether access is granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the refusal reason, if access was refused.
    #[must_use]
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Unauthenticated => Some(DenialReason::AuthenticationRequired),
            Self::Denied(reason) => Some(reason.clone()),
            Self::Loading | Self::Allowed => None,
        }
    }

    /// Converts the decision into an error for `?`-style call sites.
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Loading => Err(AppError::Unauthorized(
                "authentication is still resolving".to_owned(),
            )),
            Self::Unauthenticated => Err(AppError::Unauthorized(
                DenialReason::AuthenticationRequired.to_string(),
            )),
            Self::Denied(reason) => Err(AppError::Forbidden(reason.to_string())),
        }
    }
}

impl<C: PermissionCatalog> RolePolicy<C> {
    /// Evaluates the guard for an authentication state.
    ///
    /// Order is fixed: loading, authentication, required role, allowed roles,
    /// route, capability. The first failing check decides.
    #[must_use]
    pub fn evaluate_access(
        &self,
        state: &AuthState,
        requirements: &AccessRequirements,
    ) -> AccessDecision {
        if state.is_loading() {
            return AccessDecision::Loading;
        }

        match state.principal() {
            Some(principal) => self.authorize_principal(principal, requirements),
            None => AccessDecision::Unauthenticated,
        }
    }

    /// Evaluates the requirements for a principal already known to be signed in.
    #[must_use]
    pub fn authorize_principal(
        &self,
        principal: &Principal,
        requirements: &AccessRequirements,
    ) -> AccessDecision {
        let role = principal.role;

        if let Some(required_role) = requirements.required_role
            && role != required_role
        {
            return AccessDecision::Denied(DenialReason::RoleRequired(required_role));
        }

        if let Some(allowed_roles) = &requirements.allowed_roles
            && !allowed_roles.contains(&role)
        {
            return AccessDecision::Denied(DenialReason::InsufficientPermissions);
        }

        if let Some(route_name) = &requirements.route_name
            && !self.can_access_route(role, route_name)
        {
            return AccessDecision::Denied(DenialReason::RouteNotAccessible(route_name.clone()));
        }

        if let Some(capability) = requirements.required_capability
            && !self.has_permission(role, capability)
        {
            return AccessDecision::Denied(DenialReason::CapabilityRequired(capability));
        }

        AccessDecision::Allowed
    }
}

/// Evaluates the guard against the constant role catalog.
#[must_use]
pub fn evaluate_access(state: &AuthState, requirements: &AccessRequirements) -> AccessDecision {
    RolePolicy::standard().evaluate_access(state, requirements)
}

/// Fails with `Forbidden` unless the principal's role holds the capability.
pub fn require_capability(principal: &Principal, capability: Capability) -> AppResult<()> {
    RolePolicy::standard()
        .authorize_principal(
            principal,
            &AccessRequirements::none().require_capability(capability),
        )
        .into_result()
        .map_err(|_| {
            AppError::Forbidden(format!(
                "permission '{capability}' required, current role: {}",
                principal.role
            ))
        })
}
