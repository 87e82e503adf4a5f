//! Authorization checks keyed by user id.
//!
//! Each check loads the user's current role from the directory, so a role
//! change is visible to the next call without a new sign-in. Unknown and
//! deactivated users are denied. Directory failures propagate as errors.

use std::sync::Arc;

use tracing::debug;

use rolegate_core::AppResult;
use rolegate_domain::{Capability, Role, UserId};

use crate::directory_ports::UserDirectoryRepository;
use crate::role_policy::{RolePolicy, TransitionDecision, TransitionDenial};

#[cfg(test)]
mod tests;

/// Why a user-keyed check was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDenial {
    /// No directory record exists for the user.
    UserNotFound(UserId),
    /// The user's record is deactivated.
    AccountDeactivated(UserId),
    /// The user's role is not among the accepted roles.
    RoleNotAllowed {
        /// Accepted roles.
        required: Vec<Role>,
        /// Role held by the user.
        current: Role,
    },
    /// The user's role lacks the capability.
    PermissionMissing {
        /// Required capability.
        capability: Capability,
        /// Role held by the user.
        current: Role,
    },
    /// The requestor may not perform the role transition.
    Transition(TransitionDenial),
}

impl std::fmt::Display for PermissionDenial {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(user_id) => {
                write!(formatter, "user role not found for '{user_id}'")
            }
            Self::AccountDeactivated(user_id) => {
                write!(formatter, "account '{user_id}' is deactivated")
            }
            Self::RoleNotAllowed { required, current } => write!(
                formatter,
                "Required role: {}, but user has: {current}",
                join_roles(required)
            ),
            Self::PermissionMissing {
                capability,
                current,
            } => write!(
                formatter,
                "Permission '{capability}' required but not granted to {current}"
            ),
            Self::Transition(denial) => write!(formatter, "{denial}"),
        }
    }
}

/// Outcome of a user-keyed check that carries a reason when refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    /// The request may proceed.
    Allowed,
    /// The request is refused.
    Denied(PermissionDenial),
}

impl PermissionCheck {
    /// Returns whether the request may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the refusal reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&PermissionDenial> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

/// Application service answering authorization questions about stored users.
#[derive(Clone)]
pub struct PermissionService {
    directory: Arc<dyn UserDirectoryRepository>,
    policy: RolePolicy,
}

impl PermissionService {
    /// Creates a service over the standard role table.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectoryRepository>) -> Self {
        Self {
            directory,
            policy: RolePolicy::standard(),
        }
    }

    /// Returns whether the user's role holds the capability.
    pub async fn has_permission(
        &self,
        user_id: &UserId,
        capability: Capability,
    ) -> AppResult<bool> {
        Ok(match self.current_role(user_id).await? {
            Ok(role) => self.policy.has_permission(role, capability),
            Err(_) => false,
        })
    }

    /// Returns whether the user holds any of the roles.
    pub async fn has_any_role(&self, user_id: &UserId, roles: &[Role]) -> AppResult<bool> {
        Ok(match self.current_role(user_id).await? {
            Ok(role) => roles.contains(&role),
            Err(_) => false,
        })
    }

    /// Returns whether the user may open the named route.
    pub async fn can_access_route(&self, user_id: &UserId, route_name: &str) -> AppResult<bool> {
        Ok(match self.current_role(user_id).await? {
            Ok(role) => self.policy.can_access_route(role, route_name),
            Err(_) => false,
        })
    }

    /// Checks an API request against optional role and capability gates.
    ///
    /// Roles are checked before the capability.
    pub async fn validate_api_access(
        &self,
        user_id: &UserId,
        required_roles: Option<&[Role]>,
        required_permission: Option<Capability>,
    ) -> AppResult<PermissionCheck> {
        let role = match self.current_role(user_id).await? {
            Ok(role) => role,
            Err(denial) => return Ok(PermissionCheck::Denied(denial)),
        };

        if let Some(required) = required_roles
            && !required.contains(&role)
        {
            return Ok(PermissionCheck::Denied(PermissionDenial::RoleNotAllowed {
                required: required.to_vec(),
                current: role,
            }));
        }

        if let Some(capability) = required_permission
            && !self.policy.has_permission(role, capability)
        {
            return Ok(PermissionCheck::Denied(PermissionDenial::PermissionMissing {
                capability,
                current: role,
            }));
        }

        Ok(PermissionCheck::Allowed)
    }

    /// Previews whether the requestor may move the target to `new_role`.
    ///
    /// Nothing is written; [`crate::AdminDirectoryService::change_role`]
    /// performs the change.
    pub async fn can_change_role(
        &self,
        requestor_id: &UserId,
        target_id: &UserId,
        new_role: Role,
    ) -> AppResult<PermissionCheck> {
        let requestor_role = match self.current_role(requestor_id).await? {
            Ok(role) => role,
            Err(denial) => return Ok(PermissionCheck::Denied(denial)),
        };
        let Some(target) = self.directory.find_user(target_id).await? else {
            return Ok(PermissionCheck::Denied(PermissionDenial::UserNotFound(
                target_id.clone(),
            )));
        };

        Ok(
            match self
                .policy
                .evaluate_transition(target.role, new_role, requestor_role)
            {
                TransitionDecision::Allowed => PermissionCheck::Allowed,
                TransitionDecision::Denied(denial) => {
                    PermissionCheck::Denied(PermissionDenial::Transition(denial))
                }
            },
        )
    }

    async fn current_role(&self, user_id: &UserId) -> AppResult<Result<Role, PermissionDenial>> {
        let role = match self.directory.find_user(user_id).await? {
            Some(record) if record.is_active => Ok(record.role),
            Some(_) => Err(PermissionDenial::AccountDeactivated(user_id.clone())),
            None => Err(PermissionDenial::UserNotFound(user_id.clone())),
        };

        if let Err(denial) = &role {
            debug!(user_id = %user_id, reason = %denial, "permission check denied");
        }
        Ok(role)
    }
}

/// Builds the message shown to a caller refused access.
///
/// `current_role` is `None` for unauthenticated callers. Required roles take
/// precedence over a required capability.
#[must_use]
pub fn access_denied_message(
    current_role: Option<Role>,
    required_roles: Option<&[Role]>,
    required_permission: Option<Capability>,
) -> String {
    let Some(current) = current_role else {
        return "Authentication required".to_owned();
    };

    if let Some(required) = required_roles {
        return format!(
            "Access denied. Required role: {}, current role: {current}",
            join_roles(required)
        );
    }

    if let Some(capability) = required_permission {
        return format!("Access denied. Permission '{capability}' required");
    }

    "Access denied. Insufficient permissions".to_owned()
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(" or ")
}
