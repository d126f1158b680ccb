//! Session state: identity, cart, and wishlist behind one context object.
//!
//! The context replaces ambient module-level singletons with an explicit
//! object the UI passes around: it owns the three stores, wires the
//! "identity changed" signal (login, register, logout, restore all re-scope
//! the cart and wishlist), and carries the lifecycle
//! (`init` -> `restore` -> ... -> `teardown`).

pub mod cart;
mod guard;
pub mod identity;
pub mod wishlist;

pub use cart::CartManager;
pub use identity::{AuthError, Credentials, IdentityStore, NewAccount, TokenHandle};
pub use wishlist::{Toggled, WishlistManager};

use std::sync::Arc;

use shophub_core::{Identity, Scope};

use crate::api::AuthBackend;
use crate::error::Result;
use crate::store::KvStore;

/// Storage keys owned by the session layer.
pub mod keys {
    /// Key for the persisted active identity. Cart and wishlist keys are
    /// derived per scope via [`Scope`](shophub_core::Scope).
    pub const SESSION: &str = "session";
}

/// The session context: process-wide state for the life of the client.
///
/// Cheaply cloneable via `Arc`. All mutation of session state goes through
/// this object's components; no other code path touches the persisted
/// records.
pub struct SessionContext<B, S: KvStore> {
    inner: Arc<SessionInner<B, S>>,
}

impl<B, S: KvStore> Clone for SessionContext<B, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<B, S: KvStore> {
    backend: Arc<B>,
    identity: IdentityStore<S>,
    cart: CartManager<S>,
    wishlist: WishlistManager<S>,
}

impl<B: AuthBackend, S: KvStore> SessionContext<B, S> {
    /// Create a context in the guest scope, hydrating whatever guest state
    /// survived the last run.
    ///
    /// `token` must be the same handle given to the HTTP client, so the
    /// bearer token follows identity changes.
    #[must_use]
    pub fn init(backend: Arc<B>, store: Arc<S>, token: TokenHandle) -> Self {
        let identity = IdentityStore::new(Arc::clone(&store), token);
        let cart = CartManager::new(Arc::clone(&store));
        let wishlist = WishlistManager::new(store);

        cart.rescope(Scope::Guest);
        wishlist.rescope(Scope::Guest);

        Self {
            inner: Arc::new(SessionInner {
                backend,
                identity,
                cart,
                wishlist,
            }),
        }
    }

    /// Restore a persisted identity, if one exists, and re-scope the cart
    /// and wishlist to it. Run once at startup; never contacts the backend.
    pub fn restore(&self) -> Option<Identity> {
        let identity = self.inner.identity.restore()?;
        self.rescope_to(identity.scope());
        Some(identity)
    }

    /// Log in and re-scope the cart and wishlist to the new identity.
    ///
    /// The guest cart is **not** merged into the identity's cart; whether
    /// it should be is an open product question, and silently merging (or
    /// silently discarding) would bake in an answer.
    ///
    /// # Errors
    ///
    /// Authentication and transport failures; on any error the prior
    /// session state is untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let identity = self
            .inner
            .identity
            .login(self.inner.backend.as_ref(), credentials)
            .await?;
        self.rescope_to(identity.scope());
        Ok(identity)
    }

    /// Register a new account and re-scope to it.
    ///
    /// # Errors
    ///
    /// As for [`login`](Self::login).
    pub async fn register(&self, account: &NewAccount) -> Result<Identity> {
        let identity = self
            .inner
            .identity
            .register(self.inner.backend.as_ref(), account)
            .await?;
        self.rescope_to(identity.scope());
        Ok(identity)
    }

    /// Log out: the single authorized trigger for clearing in-memory cart
    /// and wishlist state.
    ///
    /// Clears the active identity and its persisted `session` record, and
    /// drops to an empty guest scope. The identity's persisted cart and
    /// wishlist records stay on disk, to be rehydrated on its next login.
    /// Also the forced-logout path when a request reports the token
    /// expired.
    pub fn logout(&self) {
        self.inner.identity.logout();
        self.inner.cart.clear_in_memory();
        self.inner.wishlist.clear_in_memory();
    }

    /// End-of-life: drop all in-memory state but keep the persisted
    /// `session` record, so the next launch restores the same identity.
    pub fn teardown(&self) {
        self.inner.identity.clear_in_memory();
        self.inner.cart.clear_in_memory();
        self.inner.wishlist.clear_in_memory();
    }

    fn rescope_to(&self, scope: Scope) {
        self.inner.cart.rescope(scope.clone());
        self.inner.wishlist.rescope(scope);
    }

    /// The identity store.
    #[must_use]
    pub fn identity(&self) -> &IdentityStore<S> {
        &self.inner.identity
    }

    /// The cart manager.
    #[must_use]
    pub fn cart(&self) -> &CartManager<S> {
        &self.inner.cart
    }

    /// The wishlist manager.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistManager<S> {
        &self.inner.wishlist
    }

    /// The backend the identity store authenticates against.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }
}
