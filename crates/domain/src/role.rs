//! Role catalog: the three roles, their grants and display metadata.

use std::str::FromStr;

use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::permission::{
    ADMIN_PERMISSIONS, CUSTOMER_PERMISSIONS, PermissionSet, VENDOR_PERMISSIONS,
};

/// Coarse-grained authorization role.
///
/// Roles carry no rank. Capability is decided by the permission table only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper browsing products and placing orders.
    Customer,
    /// Seller managing products and processing orders.
    Vendor,
    /// Platform operator.
    Admin,
}

/// Role assigned to every newly registered user.
pub const DEFAULT_ROLE: Role = Role::Customer;

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Customer, Role::Vendor, Role::Admin];

        ALL
    }

    /// Returns the constant grants held by this role.
    #[must_use]
    pub fn permissions(&self) -> &'static PermissionSet {
        match self {
            Self::Customer => &CUSTOMER_PERMISSIONS,
            Self::Vendor => &VENDOR_PERMISSIONS,
            Self::Admin => &ADMIN_PERMISSIONS,
        }
    }

    /// Returns the catalog entry for this role.
    #[must_use]
    pub fn config(&self) -> &'static RoleConfig {
        match self {
            Self::Customer => &CUSTOMER_CONFIG,
            Self::Vendor => &VENDOR_CONFIG,
            Self::Admin => &ADMIN_CONFIG,
        }
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Self::Customer),
            "vendor" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Catalog entry pairing a role with its grants and display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    /// Role described by this entry.
    pub role: Role,
    /// Constant grants for the role.
    pub permissions: &'static PermissionSet,
    /// Human-readable role name.
    pub display_name: &'static str,
    /// Short description of what the role can do.
    pub description: &'static str,
}

impl RoleConfig {
    /// Returns the catalog entries for every role.
    #[must_use]
    pub fn all() -> [&'static RoleConfig; 3] {
        [&CUSTOMER_CONFIG, &VENDOR_CONFIG, &ADMIN_CONFIG]
    }
}

static CUSTOMER_CONFIG: RoleConfig = RoleConfig {
    role: Role::Customer,
    permissions: &CUSTOMER_PERMISSIONS,
    display_name: "Customer",
    description: "Can browse products, place orders, and chat with vendors",
};

static VENDOR_CONFIG: RoleConfig = RoleConfig {
    role: Role::Vendor,
    permissions: &VENDOR_PERMISSIONS,
    display_name: "Vendor",
    description: "Can manage products, process orders, and communicate with customers",
};

static ADMIN_CONFIG: RoleConfig = RoleConfig {
    role: Role::Admin,
    permissions: &ADMIN_PERMISSIONS,
    display_name: "Administrator",
    description: "Full system access including user management and platform oversight",
};
