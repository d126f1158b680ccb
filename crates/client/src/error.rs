//! Unified error handling.
//!
//! Each subsystem carries its own error enum (`NormalizeError`, `ApiError`,
//! `AuthError`, `StoreError`); this module funnels them into one
//! [`ClientError`] for callers that drive the session as a whole. No error
//! here is fatal to the client - the worst case is a degraded view (stale
//! or empty data) with a surfaced message.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::normalize::NormalizeError;
use crate::session::identity::AuthError;
use crate::store::StoreError;

/// Top-level error type for the ShopHub client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A payload was present but malformed.
    #[error("validation error: {0}")]
    Validation(#[from] NormalizeError),

    /// Login/register was rejected, or a token-gated request bounced.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A backend request failed.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// The durable store failed; the in-memory state is still good.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Whether this failure is transient: the UI should keep last-known-good
    /// data on screen and offer a retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Api(ApiError::Transient(_)))
    }

    /// Whether this failure means the session's token is no longer valid
    /// and the caller must force a logout.
    #[must_use]
    pub const fn requires_logout(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Unauthorized(_)) | Self::Auth(AuthError::SessionExpired)
        )
    }
}

/// Result type alias for [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;
