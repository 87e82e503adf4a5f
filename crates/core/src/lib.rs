//! Shared primitives for all Rust crates in rolegate.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::IdentityClaims;

/// Result type used across rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input, unknown role/capability key or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence or collaborator failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable machine-readable code for this error category.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "RESOURCE_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "AUTH_REQUIRED",
            Self::Forbidden(_) => "ACCESS_DENIED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message a presentation layer shows to the end user.
    ///
    /// Authorization failures carry their specific, role-aware detail.
    /// Missing resources and persistence failures get a generic message that
    /// suggests retrying.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(detail) => format!("Please check your input: {detail}"),
            Self::Unauthorized(_) => "Authentication required".to_owned(),
            Self::Forbidden(detail) => format!("Access denied. {detail}"),
            Self::NotFound(_) => {
                "The requested record could not be found. Please refresh and try again.".to_owned()
            }
            Self::Conflict(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_owned()
            }
        }
    }

    /// Returns whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
