//! The authenticated shopper's identity.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::IdentityId;
use crate::types::scope::Scope;

/// Session record for a logged-in shopper.
///
/// Exists only while authenticated: created from the auth backend's
/// login/register payload, destroyed on logout. At most one identity is
/// active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user identifier.
    pub id: IdentityId,
    /// Account email address.
    pub email: Email,
    /// Name shown in the UI; empty when the account has none.
    pub display_name: String,
    /// Bearer token issued by the auth backend, attached to subsequent
    /// requests. `None` for legacy records persisted before tokens existed.
    pub token: Option<String>,
}

impl Identity {
    /// The persistence scope owned by this identity.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::Identity(self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_keyed_by_identity_id() {
        let identity = Identity {
            id: IdentityId::new("u1"),
            email: Email::parse("a@b.c").expect("valid email"),
            display_name: "Alice".to_owned(),
            token: Some("jwt".to_owned()),
        };
        assert_eq!(identity.scope().cart_key(), "cart:u1");
    }
}
