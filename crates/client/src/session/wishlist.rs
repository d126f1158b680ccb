//! The wishlist manager.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use shophub_core::{Product, ProductId, Scope, WishlistEntry};

use crate::session::guard::KeyedGuard;
use crate::store::KvStore;

/// Result of a [`WishlistManager::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// The product was not on the list and has been added.
    Added,
    /// The product was on the list and has been removed.
    Removed,
}

/// Scope-partitioned wishlist with set semantics over product id.
///
/// Persistence discipline is identical to the cart: write-through of the
/// full entry list under the scope's key, corrupt records degrade to empty,
/// memory (not storage) is cleared on logout.
///
/// `toggle` holds a per-product-id guard for its whole read-modify-persist
/// sequence, so rapid repeated clicks on one product serialize - the second
/// toggle observes the first's result - while toggles on different
/// products never contend.
pub struct WishlistManager<S: KvStore> {
    store: Arc<S>,
    scope: Mutex<Scope>,
    entries: Mutex<Vec<WishlistEntry>>,
    guards: KeyedGuard,
    persist_lock: Mutex<()>,
}

impl<S: KvStore> WishlistManager<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scope: Mutex::new(Scope::Guest),
            entries: Mutex::new(Vec::new()),
            guards: KeyedGuard::new(),
            persist_lock: Mutex::new(()),
        }
    }

    /// Flip a product's membership, snapshotting it on add.
    ///
    /// Toggling twice returns to the original state.
    pub fn toggle(&self, product: &Product) -> Toggled {
        self.guards.with(product.id.as_str(), || {
            let toggled = {
                let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
                match entries.iter().position(|entry| entry.product_id == product.id) {
                    Some(index) => {
                        entries.remove(index);
                        Toggled::Removed
                    }
                    None => {
                        entries.push(WishlistEntry::new(product.clone()));
                        Toggled::Added
                    }
                }
            };
            self.persist();
            toggled
        })
    }

    /// Whether the product is on the list.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.product_id == *product_id)
    }

    /// Remove a product, if present.
    pub fn remove(&self, product_id: &ProductId) {
        self.guards.with(product_id.as_str(), || {
            {
                let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
                entries.retain(|entry| entry.product_id != *product_id);
            }
            self.persist();
        });
    }

    /// Current entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Switch to `scope` and hydrate its persisted record.
    pub(crate) fn rescope(&self, scope: Scope) {
        let key = scope.wishlist_key();
        let restored: Vec<WishlistEntry> = match self.store.get_record(&key) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, key, "wishlist record unreadable; starting empty");
                Vec::new()
            }
        };

        let mut current_scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *current_scope = scope;
        *entries = restored;
    }

    /// Logout path: drop in-memory state, storage untouched.
    pub(crate) fn clear_in_memory(&self) {
        let mut current_scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *current_scope = Scope::Guest;
        entries.clear();
    }

    fn persist(&self) {
        let _write = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (key, snapshot) = {
            let scope = self.scope.lock().unwrap_or_else(PoisonError::into_inner);
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            (scope.wishlist_key(), entries.clone())
        };
        if let Err(error) = self.store.put_record(&key, &snapshot) {
            warn!(%error, key, "wishlist write-through failed; mutation will not survive a reload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shophub_core::IdentityId;

    use crate::store::MemoryStore;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: 9.99,
            image: String::new(),
            rating: 4.0,
            review_count: 1,
            description: String::new(),
            category: String::new(),
            in_stock: true,
        }
    }

    fn manager() -> (WishlistManager<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (WishlistManager::new(Arc::clone(&store)), store)
    }

    #[test]
    fn toggle_twice_returns_to_original_state() {
        let (wishlist, _) = manager();
        let widget = product("p1");

        assert_eq!(wishlist.toggle(&widget), Toggled::Added);
        assert!(wishlist.contains(&widget.id));

        assert_eq!(wishlist.toggle(&widget), Toggled::Removed);
        assert!(!wishlist.contains(&widget.id));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn membership_is_a_set_over_product_id() {
        let (wishlist, _) = manager();
        wishlist.toggle(&product("p1"));
        wishlist.toggle(&product("p2"));

        assert_eq!(wishlist.len(), 2);
        wishlist.remove(&ProductId::new("p1"));
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.contains(&ProductId::new("p2")));
    }

    #[test]
    fn toggles_are_written_through() {
        let (wishlist, store) = manager();
        wishlist.toggle(&product("p1"));

        let persisted: Vec<WishlistEntry> = store
            .get_record("wishlist:guest")
            .expect("read")
            .expect("present");
        assert_eq!(persisted.len(), 1);

        wishlist.toggle(&product("p1"));
        let persisted: Vec<WishlistEntry> = store
            .get_record("wishlist:guest")
            .expect("read")
            .expect("present");
        assert!(persisted.is_empty());
    }

    #[test]
    fn rescope_isolates_identities() {
        let (wishlist, _) = manager();
        let alice = Scope::Identity(IdentityId::new("alice"));
        let bob = Scope::Identity(IdentityId::new("bob"));

        wishlist.rescope(alice.clone());
        wishlist.toggle(&product("p1"));

        wishlist.rescope(bob);
        assert!(wishlist.is_empty(), "bob must not see alice's list");

        wishlist.rescope(alice);
        assert!(wishlist.contains(&ProductId::new("p1")));
    }

    #[test]
    fn an_even_number_of_racing_toggles_nets_out_absent() {
        let store = Arc::new(MemoryStore::new());
        let wishlist = Arc::new(WishlistManager::new(Arc::clone(&store)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let wishlist = Arc::clone(&wishlist);
                std::thread::spawn(move || wishlist.toggle(&product("p1")))
            })
            .collect();
        let outcomes: Vec<Toggled> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();

        // Serialized per key: toggles strictly alternate, so an even count
        // lands back on "absent" in memory and in storage.
        assert_eq!(
            outcomes.iter().filter(|t| **t == Toggled::Added).count(),
            4
        );
        assert!(!wishlist.contains(&ProductId::new("p1")));
        let persisted: Vec<WishlistEntry> = store
            .get_record("wishlist:guest")
            .expect("read")
            .expect("present");
        assert!(persisted.is_empty());
    }
}
