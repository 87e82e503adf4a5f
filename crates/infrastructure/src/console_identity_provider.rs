//! Console identity provider for development. Logs sign-in codes to tracing output.

use std::collections::HashMap;
use std::fmt::Write;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rolegate_application::IdentityProvider;
use rolegate_core::{AppError, AppResult, IdentityClaims};
use rolegate_domain::EmailAddress;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::info;

const CODE_TTL_MINUTES: i64 = 10;
const CODE_MODULUS: u32 = 1_000_000;

#[derive(Debug, Clone)]
struct PendingCode {
    code_hash: String,
    expires_at: DateTime<Utc>,
}

/// Development identity provider issuing six-digit one-time codes.
///
/// Codes are held as SHA-256 hashes, expire after ten minutes and are
/// consumed by the first successful verification.
#[derive(Debug, Default)]
pub struct ConsoleIdentityProvider {
    pending: Mutex<HashMap<String, PendingCode>>,
}

impl ConsoleIdentityProvider {
    /// Creates a provider with no outstanding codes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stable subject id derived from a login email.
    #[must_use]
    pub fn uid_for(email: &EmailAddress) -> String {
        let digest = hash_hex(format!("uid:{}", email.as_str()).as_str());
        format!("usr_{}", &digest[..24])
    }

    pub(crate) async fn issue_code(&self, email: &EmailAddress) -> AppResult<String> {
        let code = generate_code()?;

        self.pending.lock().await.insert(
            email.as_str().to_owned(),
            PendingCode {
                code_hash: hash_hex(code.as_str()),
                expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
            },
        );

        Ok(code)
    }
}

#[async_trait]
impl IdentityProvider for ConsoleIdentityProvider {
    async fn send_code(&self, email: &EmailAddress) -> AppResult<()> {
        let code = self.issue_code(email).await?;

        info!(
            to = email.as_str(),
            "--- SIGN-IN CODE (console) ---\nTo: {}\nCode: {}\n--- END SIGN-IN CODE ---",
            email.as_str(),
            code
        );

        Ok(())
    }

    async fn verify_code(&self, email: &EmailAddress, code: &str) -> AppResult<IdentityClaims> {
        let mut pending = self.pending.lock().await;

        let matches = pending.get(email.as_str()).is_some_and(|entry| {
            entry.expires_at > Utc::now() && entry.code_hash == hash_hex(code.trim())
        });
        if !matches {
            return Err(AppError::Unauthorized(
                "invalid or expired verification code".to_owned(),
            ));
        }

        pending.remove(email.as_str());
        Ok(IdentityClaims::new(
            Self::uid_for(email),
            Some(email.as_str().to_owned()),
        ))
    }
}

fn generate_code() -> AppResult<String> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes).map_err(|error| {
        AppError::Internal(format!("failed to generate verification code: {error}"))
    })?;

    Ok(format!("{:06}", u32::from_le_bytes(bytes) % CODE_MODULUS))
}

fn hash_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use rolegate_application::IdentityProvider;
    use rolegate_core::AppError;
    use rolegate_domain::EmailAddress;

    use super::ConsoleIdentityProvider;

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value).unwrap_or_else(|_| panic!("invalid test email"))
    }

    #[tokio::test]
    async fn issued_code_verifies_once() {
        let provider = ConsoleIdentityProvider::new();
        let address = email("ada@example.com");

        let code = provider
            .issue_code(&address)
            .await
            .unwrap_or_else(|error| panic!("issue failed: {error}"));
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|character| character.is_ascii_digit()));

        let claims = provider
            .verify_code(&address, code.as_str())
            .await
            .unwrap_or_else(|error| panic!("verify failed: {error}"));
        assert_eq!(claims.uid(), ConsoleIdentityProvider::uid_for(&address));
        assert_eq!(claims.email(), Some("ada@example.com"));

        let replay = provider.verify_code(&address, code.as_str()).await;
        assert!(matches!(replay, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_and_code_survives() {
        let provider = ConsoleIdentityProvider::new();
        let address = email("ada@example.com");
        let code = provider
            .issue_code(&address)
            .await
            .unwrap_or_else(|error| panic!("issue failed: {error}"));
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let result = provider.verify_code(&address, wrong).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert!(provider.verify_code(&address, code.as_str()).await.is_ok());
    }

    #[tokio::test]
    async fn code_without_request_is_rejected() {
        let provider = ConsoleIdentityProvider::new();

        let result = provider
            .verify_code(&email("nobody@example.com"), "123456")
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn uid_is_stable_per_email() {
        let first = ConsoleIdentityProvider::uid_for(&email("ada@example.com"));
        let second = ConsoleIdentityProvider::uid_for(&email("ada@example.com"));
        let other = ConsoleIdentityProvider::uid_for(&email("bob@example.com"));

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.starts_with("usr_"));
    }
}
