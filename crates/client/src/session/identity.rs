//! The identity store: who is logged in, and their token.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use shophub_core::Identity;

use crate::api::{ApiError, AuthBackend, AuthPayload};
use crate::normalize::{normalize_identity, NormalizeError};
use crate::session::keys;
use crate::store::KvStore;

/// Login form contents. `username` also accepts the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration form contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Optional display name, forwarded as the account's first name.
    pub display_name: Option<String>,
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the credentials. The prior identity, if any,
    /// is untouched.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The backend accepted but answered with an unusable user payload.
    #[error("auth payload unusable: {0}")]
    MalformedPayload(#[from] NormalizeError),

    /// A token-gated request bounced; the session must be logged out.
    #[error("session expired")]
    SessionExpired,

    /// Transport-level failure reaching the auth backend.
    #[error(transparent)]
    Api(ApiError),
}

/// Shared slot holding the current bearer token.
///
/// The identity store writes it on login/logout; the HTTP client reads it
/// when building each request. Sharing the slot instead of the store breaks
/// the construction cycle between the two.
#[derive(Debug, Clone, Default)]
pub struct TokenHandle(Arc<RwLock<Option<String>>>);

impl TokenHandle {
    /// Current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, token: Option<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

/// Holds the active [`Identity`] and its lifecycle.
///
/// At most one identity is active. All state transitions go through
/// [`login`](Self::login), [`register`](Self::register),
/// [`logout`](Self::logout), and [`restore`](Self::restore); nothing else
/// writes the persisted `session` record.
pub struct IdentityStore<S: KvStore> {
    store: Arc<S>,
    current: RwLock<Option<Identity>>,
    token: TokenHandle,
}

impl<S: KvStore> IdentityStore<S> {
    pub(crate) fn new(store: Arc<S>, token: TokenHandle) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            token,
        }
    }

    /// The token slot shared with the HTTP client.
    #[must_use]
    pub fn token_handle(&self) -> TokenHandle {
        self.token.clone()
    }

    /// The active identity, if any.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a shopper is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Exchange credentials for an active identity.
    ///
    /// On success the new identity replaces the active one, is persisted
    /// under `session`, and its token becomes current. On rejection the
    /// prior identity is left untouched.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] for bad credentials, [`AuthError::Api`] for
    /// transport failures, [`AuthError::MalformedPayload`] when the backend
    /// answers without a usable user object.
    pub async fn login<B: AuthBackend>(
        &self,
        backend: &B,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let payload = backend.login(credentials).await.map_err(auth_error)?;
        self.install(&payload)
    }

    /// Create an account and make it the active identity.
    ///
    /// # Errors
    ///
    /// As for [`login`](Self::login); a duplicate username/email surfaces
    /// as [`AuthError::Rejected`].
    pub async fn register<B: AuthBackend>(
        &self,
        backend: &B,
        account: &NewAccount,
    ) -> Result<Identity, AuthError> {
        let payload = backend.register(account).await.map_err(auth_error)?;
        self.install(&payload)
    }

    fn install(&self, payload: &AuthPayload) -> Result<Identity, AuthError> {
        let identity = normalize_identity(&payload.user, payload.access_token.clone())?;

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        self.token.set(identity.token.clone());

        if let Err(error) = self.store.put_record(keys::SESSION, &identity) {
            warn!(%error, "session record write failed; identity will not survive a reload");
        }

        Ok(identity)
    }

    /// Clear the active identity, its token, and the persisted `session`
    /// record. Cart/wishlist records are keyed by scope and are not
    /// touched.
    pub fn logout(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.token.set(None);

        if let Err(error) = self.store.remove(keys::SESSION) {
            warn!(%error, "failed to delete the session record");
        }
    }

    /// Drop the in-memory identity without deleting the persisted record,
    /// so the next launch can [`restore`](Self::restore) it.
    pub(crate) fn clear_in_memory(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.token.set(None);
    }

    /// Restore a persisted identity at startup, without contacting the
    /// backend.
    ///
    /// A structurally invalid or corrupt record is logged and treated as
    /// absent. The restored token is *not* validated here; an expired token
    /// is discovered on the first rejected request, at which point the
    /// caller must force logout.
    pub fn restore(&self) -> Option<Identity> {
        let identity = match self.store.get_record::<Identity>(keys::SESSION) {
            Ok(Some(identity)) if !identity.id.as_str().is_empty() => identity,
            Ok(Some(_)) => {
                warn!("persisted session record has an empty id; ignoring");
                return None;
            }
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "persisted session record unreadable; starting logged out");
                return None;
            }
        };

        debug!(identity_id = %identity.id, "restored session");
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        self.token.set(identity.token.clone());
        Some(identity)
    }
}

fn auth_error(error: ApiError) -> AuthError {
    match error {
        ApiError::Unauthorized(message) | ApiError::Backend { message, status: 400 } => {
            AuthError::Rejected(message)
        }
        other => AuthError::Api(other),
    }
}
