use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{AppResult, IdentityClaims};
use rolegate_domain::{EmailAddress, Principal, Role, UserId, UserProfile};

/// Identity provider issuing and checking one-time email codes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sends a one-time code to the address.
    async fn send_code(&self, email: &EmailAddress) -> AppResult<()>;

    /// Checks a code and returns the authenticated identity.
    ///
    /// Wrong or expired codes fail with `Unauthorized`.
    async fn verify_code(&self, email: &EmailAddress, code: &str) -> AppResult<IdentityClaims>;
}

/// Local key/value storage for offline session bootstrap.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Removes a value; missing keys are not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// Last known authenticated session, cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// Authenticated user id.
    pub uid: UserId,
    /// Login email.
    pub email: Option<String>,
    /// Role at sign-in time.
    pub role: Role,
    /// Sign-in time.
    pub last_login: DateTime<Utc>,
}

impl SessionData {
    /// Builds a principal from the cached session alone.
    ///
    /// Used when the directory cannot be reached. The profile is empty and
    /// the sign-in time stands in for both timestamps. Returns `None` when
    /// the cached email is missing or invalid.
    #[must_use]
    pub fn to_cached_principal(&self) -> Option<Principal> {
        let email = EmailAddress::new(self.email.as_deref()?).ok()?;
        Some(Principal {
            id: self.uid.clone(),
            email,
            role: self.role,
            profile: UserProfile::default(),
            created_at: self.last_login,
            updated_at: self.last_login,
        })
    }
}

/// Registration details held until the code is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInput {
    /// Login email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
