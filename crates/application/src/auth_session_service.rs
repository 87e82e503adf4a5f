use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use rolegate_core::{AppError, AppResult, IdentityClaims, NonEmptyString};
use rolegate_domain::{DEFAULT_ROLE, EmailAddress, Principal, UserId, UserProfile};

use crate::access_guard::AuthState;
use crate::directory_ports::{UserDirectoryRepository, UserRecord};
use crate::session_ports::{IdentityProvider, RegistrationInput, SessionCache, SessionData};

/// Session cache key holding the last authenticated session.
pub const SESSION_KEY: &str = "user_session";

/// Session cache key holding registration details awaiting verification.
pub const PENDING_REGISTRATION_KEY: &str = "pending_registration";

/// Application service for one-time-code sign-in and session bootstrap.
#[derive(Clone)]
pub struct AuthSessionService {
    identity_provider: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectoryRepository>,
    session_cache: Arc<dyn SessionCache>,
}

impl AuthSessionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectoryRepository>,
        session_cache: Arc<dyn SessionCache>,
    ) -> Self {
        Self {
            identity_provider,
            directory,
            session_cache,
        }
    }

    /// Sends a sign-in code to an existing or new user.
    pub async fn request_code(&self, email: &str) -> AppResult<()> {
        let email = EmailAddress::new(email)?;
        self.identity_provider.send_code(&email).await
    }

    /// Stores registration details and sends a verification code.
    pub async fn register(&self, input: RegistrationInput) -> AppResult<()> {
        let email = EmailAddress::new(input.email.as_str())?;
        NonEmptyString::new(input.first_name.as_str())
            .map_err(|_| AppError::Validation("first name is required".to_owned()))?;
        NonEmptyString::new(input.last_name.as_str())
            .map_err(|_| AppError::Validation("last name is required".to_owned()))?;

        let pending = RegistrationInput {
            email: email.as_str().to_owned(),
            ..input
        };
        let payload = serde_json::to_string(&pending).map_err(|error| {
            AppError::Internal(format!("failed to serialize pending registration: {error}"))
        })?;

        self.session_cache
            .set(PENDING_REGISTRATION_KEY, payload.as_str())
            .await?;
        self.identity_provider.send_code(&email).await
    }

    /// Verifies a code and returns the signed-in principal.
    ///
    /// First sign-in creates the directory record with the default role.
    pub async fn verify_code(&self, email: &str, code: &str) -> AppResult<Principal> {
        let email = EmailAddress::new(email)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::Validation(
                "verification code is required".to_owned(),
            ));
        }

        let claims = self.identity_provider.verify_code(&email, code).await?;
        let user_id = UserId::new(claims.uid())?;
        let now = Utc::now();

        let record = match self.directory.find_user(&user_id).await? {
            Some(record) => record,
            None => self.create_record(user_id, &claims, &email, now).await?,
        };

        if !record.is_active {
            return Err(AppError::Forbidden(format!(
                "account '{}' is deactivated",
                record.id
            )));
        }

        self.directory.record_login(&record.id, now).await?;
        if let Err(error) = self.store_session(&record, now).await {
            warn!(
                user_id = %record.id,
                error = %error,
                "failed to cache session after sign-in"
            );
        }

        info!(user_id = %record.id, role = record.role.as_str(), "user signed in");
        Ok(record.to_principal())
    }

    /// Rebuilds the authentication state from the cached session.
    ///
    /// The principal is reloaded from the directory so role changes made
    /// since the last sign-in apply. When the directory is unreachable the
    /// cached session is trusted as is. A corrupt cached session is removed;
    /// a cache that cannot be read leaves the stored session untouched.
    pub async fn restore_session(&self) -> AuthState {
        let session = match self.read_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return AuthState::anonymous(),
            Err(AppError::Validation(message)) => {
                warn!(error = %message, "discarding unreadable cached session");
                self.clear_session_quietly().await;
                return AuthState::anonymous();
            }
            Err(error) => {
                warn!(error = %error, "session cache unavailable");
                return AuthState::anonymous();
            }
        };

        match self.directory.find_user(&session.uid).await {
            Ok(Some(record)) if record.is_active => {
                if record.role != session.role
                    && let Err(error) = self.store_session(&record, session.last_login).await
                {
                    warn!(user_id = %record.id, error = %error, "failed to refresh cached session");
                }
                AuthState::authenticated(record.to_principal())
            }
            Ok(_) => {
                info!(user_id = %session.uid, "cached session no longer maps to an active user");
                self.clear_session_quietly().await;
                AuthState::anonymous()
            }
            Err(error) => match session.to_cached_principal() {
                Some(principal) => {
                    warn!(
                        user_id = %session.uid,
                        error = %error,
                        "directory unavailable, restoring cached session"
                    );
                    AuthState::authenticated(principal)
                }
                None => {
                    warn!(user_id = %session.uid, error = %error, "failed to restore session");
                    AuthState::anonymous()
                }
            },
        }
    }

    /// Drops the cached session.
    pub async fn logout(&self) -> AppResult<()> {
        self.session_cache.remove(SESSION_KEY).await
    }

    async fn create_record(
        &self,
        user_id: UserId,
        claims: &IdentityClaims,
        email: &EmailAddress,
        now: DateTime<Utc>,
    ) -> AppResult<UserRecord> {
        let pending = self.take_pending_registration(email).await;
        let record_email = match claims.email() {
            Some(value) => EmailAddress::new(value)?,
            None => email.clone(),
        };
        let profile = pending
            .map(|registration| UserProfile {
                phone: registration.phone,
                ..UserProfile::named(registration.first_name, registration.last_name)
            })
            .unwrap_or_default();

        let record = UserRecord::registered(user_id, record_email, DEFAULT_ROLE, profile, now);
        self.directory.create_user(record.clone()).await?;

        info!(user_id = %record.id, "created user record on first sign-in");
        Ok(record)
    }

    async fn take_pending_registration(&self, email: &EmailAddress) -> Option<RegistrationInput> {
        let payload = match self.session_cache.get(PENDING_REGISTRATION_KEY).await {
            Ok(payload) => payload?,
            Err(error) => {
                warn!(error = %error, "failed to read pending registration");
                return None;
            }
        };

        let registration = serde_json::from_str::<RegistrationInput>(payload.as_str())
            .ok()
            .filter(|registration| registration.email == email.as_str());

        if registration.is_some()
            && let Err(error) = self.session_cache.remove(PENDING_REGISTRATION_KEY).await
        {
            warn!(error = %error, "failed to clear pending registration");
        }

        registration
    }

    async fn store_session(&self, record: &UserRecord, last_login: DateTime<Utc>) -> AppResult<()> {
        let session = SessionData {
            uid: record.id.clone(),
            email: Some(record.email.as_str().to_owned()),
            role: record.role,
            last_login,
        };
        let payload = serde_json::to_string(&session).map_err(|error| {
            AppError::Internal(format!("failed to serialize session: {error}"))
        })?;

        self.session_cache.set(SESSION_KEY, payload.as_str()).await
    }

    async fn read_session(&self) -> AppResult<Option<SessionData>> {
        let Some(payload) = self.session_cache.get(SESSION_KEY).await? else {
            return Ok(None);
        };

        serde_json::from_str(payload.as_str())
            .map(Some)
            .map_err(|error| AppError::Validation(format!("invalid cached session: {error}")))
    }

    async fn clear_session_quietly(&self) {
        if let Err(error) = self.session_cache.remove(SESSION_KEY).await {
            warn!(error = %error, "failed to clear cached session");
        }
    }
}
