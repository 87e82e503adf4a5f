use std::str::FromStr;

use rolegate_core::AppError;
use serde::{Deserialize, Serialize};

/// Named boolean grants checked by application policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Allows listing customer accounts.
    #[serde(rename = "canViewCustomers")]
    ViewCustomers,
    /// Allows listing vendor accounts.
    #[serde(rename = "canViewVendors")]
    ViewVendors,
    /// Allows entering the administration screens.
    #[serde(rename = "canViewAdminPanel")]
    ViewAdminPanel,
    /// Allows changing the role of any user.
    #[serde(rename = "canModifyUserRoles")]
    ModifyUserRoles,
    /// Allows reading every order on the platform.
    #[serde(rename = "canViewAllOrders")]
    ViewAllOrders,
    /// Allows listing new products.
    #[serde(rename = "canCreateProducts")]
    CreateProducts,
    /// Allows editing products the user owns.
    #[serde(rename = "canManageOwnProducts")]
    ManageOwnProducts,
    /// Allows fulfilling incoming orders.
    #[serde(rename = "canProcessOrders")]
    ProcessOrders,
    /// Allows using customer/vendor chat.
    #[serde(rename = "canAccessChat")]
    AccessChat,
}

impl Capability {
    /// Returns the stable key for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewCustomers => "canViewCustomers",
            Self::ViewVendors => "canViewVendors",
            Self::ViewAdminPanel => "canViewAdminPanel",
            Self::ModifyUserRoles => "canModifyUserRoles",
            Self::ViewAllOrders => "canViewAllOrders",
            Self::CreateProducts => "canCreateProducts",
            Self::ManageOwnProducts => "canManageOwnProducts",
            Self::ProcessOrders => "canProcessOrders",
            Self::AccessChat => "canAccessChat",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::ViewCustomers,
            Capability::ViewVendors,
            Capability::ViewAdminPanel,
            Capability::ModifyUserRoles,
            Capability::ViewAllOrders,
            Capability::CreateProducts,
            Capability::ManageOwnProducts,
            Capability::ProcessOrders,
            Capability::AccessChat,
        ];

        ALL
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "canViewCustomers" => Ok(Self::ViewCustomers),
            "canViewVendors" => Ok(Self::ViewVendors),
            "canViewAdminPanel" => Ok(Self::ViewAdminPanel),
            "canModifyUserRoles" => Ok(Self::ModifyUserRoles),
            "canViewAllOrders" => Ok(Self::ViewAllOrders),
            "canCreateProducts" => Ok(Self::CreateProducts),
            "canManageOwnProducts" => Ok(Self::ManageOwnProducts),
            "canProcessOrders" => Ok(Self::ProcessOrders),
            "canAccessChat" => Ok(Self::AccessChat),
            _ => Err(AppError::Validation(format!(
                "unknown capability key '{value}'"
            ))),
        }
    }
}

/// Fixed-shape set of grants held by one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// See [`Capability::ViewCustomers`].
    pub can_view_customers: bool,
    /// See [`Capability::ViewVendors`].
    pub can_view_vendors: bool,
    /// See [`Capability::ViewAdminPanel`].
    pub can_view_admin_panel: bool,
    /// See [`Capability::ModifyUserRoles`].
    pub can_modify_user_roles: bool,
    /// See [`Capability::ViewAllOrders`].
    pub can_view_all_orders: bool,
    /// See [`Capability::CreateProducts`].
    pub can_create_products: bool,
    /// See [`Capability::ManageOwnProducts`].
    pub can_manage_own_products: bool,
    /// See [`Capability::ProcessOrders`].
    pub can_process_orders: bool,
    /// See [`Capability::AccessChat`].
    pub can_access_chat: bool,
}

impl PermissionSet {
    /// Returns the grant stored for one capability.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewCustomers => self.can_view_customers,
            Capability::ViewVendors => self.can_view_vendors,
            Capability::ViewAdminPanel => self.can_view_admin_panel,
            Capability::ModifyUserRoles => self.can_modify_user_roles,
            Capability::ViewAllOrders => self.can_view_all_orders,
            Capability::CreateProducts => self.can_create_products,
            Capability::ManageOwnProducts => self.can_manage_own_products,
            Capability::ProcessOrders => self.can_process_orders,
            Capability::AccessChat => self.can_access_chat,
        }
    }

    /// Returns whether at least one of the capabilities is granted.
    #[must_use]
    pub fn allows_any(&self, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .any(|capability| self.allows(*capability))
    }

    /// Iterates over the granted capabilities in declaration order.
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::all()
            .iter()
            .copied()
            .filter(|capability| self.allows(*capability))
    }
}

pub(crate) static CUSTOMER_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_customers: false,
    can_view_vendors: false,
    can_view_admin_panel: false,
    can_modify_user_roles: false,
    can_view_all_orders: false,
    can_create_products: false,
    can_manage_own_products: false,
    can_process_orders: false,
    can_access_chat: true,
};

pub(crate) static VENDOR_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_customers: false,
    can_view_vendors: false,
    can_view_admin_panel: false,
    can_modify_user_roles: false,
    can_view_all_orders: false,
    can_create_products: true,
    can_manage_own_products: true,
    can_process_orders: true,
    can_access_chat: true,
};

pub(crate) static ADMIN_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_customers: true,
    can_view_vendors: true,
    can_view_admin_panel: true,
    can_modify_user_roles: true,
    can_view_all_orders: true,
    can_create_products: true,
    can_manage_own_products: true,
    can_process_orders: true,
    can_access_chat: true,
};
