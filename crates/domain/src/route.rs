use serde::{Deserialize, Serialize};

use crate::Capability;

/// Named routes that require a capability.
///
/// Any route name not listed here is a common route open to every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppRoute {
    /// Administration landing screen.
    AdminPanel,
    /// User directory screen.
    UserManagement,
    /// Vendor overview screen.
    VendorDashboard,
    /// Product editing screen.
    ProductManagement,
    /// Customer/vendor chat screen.
    Chat,
}

impl AppRoute {
    /// Returns the navigation name for this route.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminPanel => "AdminPanel",
            Self::UserManagement => "UserManagement",
            Self::VendorDashboard => "VendorDashboard",
            Self::ProductManagement => "ProductManagement",
            Self::Chat => "Chat",
        }
    }

    /// Resolves a navigation name to a protected route.
    ///
    /// Returns `None` for open routes.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AdminPanel" => Some(Self::AdminPanel),
            "UserManagement" => Some(Self::UserManagement),
            "VendorDashboard" => Some(Self::VendorDashboard),
            "ProductManagement" => Some(Self::ProductManagement),
            "Chat" => Some(Self::Chat),
            _ => None,
        }
    }

    /// Returns the capabilities of which at least one must be granted.
    #[must_use]
    pub fn required_any_of(&self) -> &'static [Capability] {
        match self {
            Self::AdminPanel | Self::UserManagement => &[Capability::ViewAdminPanel],
            Self::VendorDashboard | Self::ProductManagement => {
                &[Capability::CreateProducts, Capability::ManageOwnProducts]
            }
            Self::Chat => &[Capability::AccessChat],
        }
    }
}
