//! Identity payload normalization.

use serde_json::Value;

use shophub_core::{Email, Identity, IdentityId};

use super::{kind_of, value, NormalizeError};

/// Build an [`Identity`] from the auth backend's `user` payload.
///
/// The display name resolves through `username` -> `first_name` -> `name`
/// -> `display_name`, defaulting to empty; the id follows the usual chain.
/// The email is required and must be structurally valid - an identity
/// without an address cannot be keyed or shown.
///
/// # Errors
///
/// [`NormalizeError::MissingId`] or [`NormalizeError::InvalidField`] for a
/// user payload without usable id/email, [`NormalizeError::InvalidEmail`]
/// for a malformed address.
pub fn normalize_identity(user: &Value, token: Option<String>) -> Result<Identity, NormalizeError> {
    let obj = user
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(user)))?;

    let email = value::text(obj, &["email"], "email")?.ok_or(NormalizeError::InvalidField {
        field: "email",
        expected: "string",
    })?;

    Ok(Identity {
        id: IdentityId::new(value::id(obj, &["id", "_id"])?),
        email: Email::parse(&email)?,
        display_name: value::text(
            obj,
            &["username", "first_name", "name", "display_name"],
            "display_name",
        )?
        .unwrap_or_default(),
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_identity_from_backend_user_dict() {
        let user = json!({
            "id": "u1",
            "username": "alice",
            "email": "Alice@Example.com",
            "first_name": "Alice",
        });
        let identity =
            normalize_identity(&user, Some("jwt".to_owned())).expect("normalizes");
        assert_eq!(identity.id, IdentityId::new("u1"));
        assert_eq!(identity.email.as_str(), "alice@example.com");
        assert_eq!(identity.display_name, "alice");
        assert_eq!(identity.token.as_deref(), Some("jwt"));
    }

    #[test]
    fn display_name_falls_back_past_username() {
        let user = json!({ "_id": "u2", "email": "b@c.d", "first_name": "Bo" });
        assert_eq!(
            normalize_identity(&user, None).expect("fallback").display_name,
            "Bo"
        );

        let bare = json!({ "_id": "u3", "email": "c@d.e" });
        assert_eq!(normalize_identity(&bare, None).expect("empty").display_name, "");
    }

    #[test]
    fn missing_user_or_email_is_rejected() {
        assert!(normalize_identity(&Value::Null, None).is_err());
        assert!(normalize_identity(&json!({ "id": "u1" }), None).is_err());
        assert!(normalize_identity(&json!({ "id": "u1", "email": "nope" }), None).is_err());
    }
}
