//! The cart manager.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use shophub_core::{CartLine, Product, ProductId, Scope};

use crate::session::guard::KeyedGuard;
use crate::store::KvStore;

/// Scope-partitioned cart state with write-through persistence.
///
/// Operations are synchronous over in-memory state; every mutation is
/// followed by a durable write of the **full current line list** under the
/// scope's key before it returns. Writing the whole snapshot (never a
/// delta) is what makes persistence last-issued-wins: whichever write
/// lands last carries the newest state.
///
/// A failed write is logged and otherwise ignored - it means "this
/// mutation will not survive a reload", never "this mutation failed".
pub struct CartManager<S: KvStore> {
    store: Arc<S>,
    scope: Mutex<Scope>,
    lines: Mutex<Vec<CartLine>>,
    guards: KeyedGuard,
    persist_lock: Mutex<()>,
}

impl<S: KvStore> CartManager<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scope: Mutex::new(Scope::Guest),
            lines: Mutex::new(Vec::new()),
            guards: KeyedGuard::new(),
            persist_lock: Mutex::new(()),
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line for the product has its quantity incremented; a new
    /// line snapshots the product at add time and keeps that snapshot even
    /// if the catalog later changes - mid-session price jumps in the cart
    /// would surprise the shopper. Adding zero units is a no-op.
    pub fn add_item(&self, product: &Product, quantity: u32) {
        if quantity == 0 {
            debug!(product_id = %product.id, "ignoring add of zero units");
            return;
        }
        self.guards.with(product.id.as_str(), || {
            {
                let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
                match lines.iter_mut().find(|line| line.product_id == product.id) {
                    Some(line) => line.quantity += quantity,
                    None => lines.push(CartLine::new(product.clone(), quantity)),
                }
            }
            self.persist();
        });
    }

    /// Set a line's quantity exactly. Zero removes the line; there is no
    /// such thing as a zero-quantity line.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: u32) {
        self.guards.with(product_id.as_str(), || {
            {
                let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
                if quantity == 0 {
                    lines.retain(|line| line.product_id != *product_id);
                } else if let Some(line) =
                    lines.iter_mut().find(|line| line.product_id == *product_id)
                {
                    line.quantity = quantity;
                }
            }
            self.persist();
        });
    }

    /// Remove a line entirely.
    pub fn remove_item(&self, product_id: &ProductId) {
        self.update_quantity(product_id, 0);
    }

    /// Empty the cart. A shopper-initiated mutation, so it persists the
    /// empty list - unlike the logout path, which leaves storage alone.
    pub fn clear(&self) {
        {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            lines.clear();
        }
        self.persist();
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cart total, recomputed from the live lines on every call.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(CartLine::line_total)
            .sum()
    }

    /// Total unit count across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|line| line.quantity)
            .sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Switch to `scope` and hydrate its persisted record.
    ///
    /// A corrupt record is logged and treated as empty; the cart must come
    /// up even when local storage is stale.
    pub(crate) fn rescope(&self, scope: Scope) {
        let key = scope.cart_key();
        let restored: Vec<CartLine> = match self.store.get_record(&key) {
            Ok(Some(lines)) => lines,
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, key, "cart record unreadable; starting empty");
                Vec::new()
            }
        };

        let mut current_scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        *current_scope = scope;
        *lines = restored;
    }

    /// Logout path: drop in-memory state and fall back to an empty guest
    /// scope. The persisted record of the identity that just logged out
    /// stays on disk for its next login.
    pub(crate) fn clear_in_memory(&self) {
        let mut current_scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        *current_scope = Scope::Guest;
        lines.clear();
    }

    /// Write the full current snapshot under the current scope's key.
    ///
    /// The snapshot is read *inside* the persist lock, so even when an
    /// earlier mutation's write is still in flight, whichever write runs
    /// later serializes the newest state.
    fn persist(&self) {
        let _write = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (key, snapshot) = {
            let scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
            let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            (scope.cart_key(), lines.clone())
        };
        if let Err(error) = self.store.put_record(&key, &snapshot) {
            warn!(%error, key, "cart write-through failed; mutation will not survive a reload");
        }
    }
}
