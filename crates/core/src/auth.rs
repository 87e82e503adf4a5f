use serde::{Deserialize, Serialize};

/// Claims returned by the identity provider after a successful code check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    uid: String,
    email: Option<String>,
}

impl IdentityClaims {
    /// Creates claims from the provider's user id and optional email.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }

    /// Returns the stable user id issued by the identity provider.
    #[must_use]
    pub fn uid(&self) -> &str {
        self.uid.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
