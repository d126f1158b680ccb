//! Per-key mutation sequencing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Serializes mutations per key without contending across keys.
///
/// Rapid repeated toggles on one product must apply in issue order - the
/// second must observe the first's result - while toggles on different
/// products stay independent. UI-level debouncing is a presentation concern
/// and guarantees nothing; this guard is the correctness boundary.
///
/// The lock map grows one entry per key ever touched; keys are product ids,
/// so the bound is the catalog size.
#[derive(Debug, Default)]
pub(crate) struct KeyedGuard {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the key's lock.
    pub(crate) fn with<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_owned()).or_default())
        };
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
