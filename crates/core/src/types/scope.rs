//! Persistence scopes.
//!
//! Cart and wishlist records are partitioned by who owns them: a logged-in
//! identity, or the anonymous "guest" shopper of this device. The scope is
//! the partition key; records from different scopes are never visible to
//! each other.

use serde::{Deserialize, Serialize};

use crate::types::id::IdentityId;

/// Partition key for persisted cart/wishlist state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Scope {
    /// Anonymous shopper, before login or after logout.
    #[default]
    Guest,
    /// A logged-in identity.
    Identity(IdentityId),
}

impl Scope {
    /// The scope segment used in storage keys.
    #[must_use]
    pub fn key_segment(&self) -> &str {
        match self {
            Self::Guest => "guest",
            Self::Identity(id) => id.as_str(),
        }
    }

    /// Storage key for this scope's cart record.
    #[must_use]
    pub fn cart_key(&self) -> String {
        format!("cart:{}", self.key_segment())
    }

    /// Storage key for this scope's wishlist record.
    #[must_use]
    pub fn wishlist_key(&self) -> String {
        format!("wishlist:{}", self.key_segment())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key_segment())
    }
}
