//! Field-extraction helpers shared by the normalizers.
//!
//! Every attribute of the canonical model resolves through an ordered
//! fallback chain of raw field names. The policy is uniform: a missing
//! optional field falls through to the chain's default, while a field that
//! is *present but of the wrong shape* is a [`NormalizeError`] - a backend
//! emitting `"price": "oops"` is a bug worth surfacing, a backend omitting
//! `price` is not.

use serde_json::{Map, Value};

use super::NormalizeError;

/// Unwrap the uniform response envelope.
///
/// Endpoints answer either `{ "data": <payload>, "message": ... }` or the
/// bare payload; callers never need to know which shape they got.
#[must_use]
pub fn payload(raw: &Value) -> &Value {
    match raw.get("data") {
        Some(inner) => inner,
        None => raw,
    }
}

/// First non-null value among `keys`, in order.
pub(crate) fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Resolve a string attribute through its fallback chain.
///
/// Absent everywhere is `Ok(None)`; present but not a string is an error.
pub(crate) fn text(
    obj: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match first_present(obj, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(NormalizeError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

/// Resolve a numeric attribute through its fallback chain.
///
/// JSON numbers and numeric strings (`"19.99"`) both parse; anything else
/// that is present is an error, and absent is `Ok(None)` so the caller can
/// apply the default-to-zero rule.
pub(crate) fn number(
    obj: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<f64>, NormalizeError> {
    let invalid = || NormalizeError::InvalidField {
        field,
        expected: "number",
    };
    match first_present(obj, keys) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Resolve a non-negative integer attribute through its fallback chain.
pub(crate) fn count(
    obj: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<u32>, NormalizeError> {
    let invalid = || NormalizeError::InvalidField {
        field,
        expected: "non-negative integer",
    };
    match number(obj, keys, field)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = n as u32;
            Ok(Some(whole))
        }
        Some(_) => Err(invalid()),
    }
}

/// Resolve a boolean attribute through its fallback chain.
pub(crate) fn boolean(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    first_present(obj, keys).and_then(Value::as_bool)
}

/// Resolve an entity id through the `id` -> `_id` chain.
///
/// Accepted shapes: a non-empty string, a number (stringified), or a Mongo
/// extended-JSON object (`{"$oid": "..."}`). Anything else - including an
/// empty string - fails loudly; an id is never fabricated.
pub(crate) fn id(
    obj: &Map<String, Value>,
    keys: &[&str],
) -> Result<String, NormalizeError> {
    match first_present(obj, keys) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Object(inner)) => match inner.get("$oid") {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(NormalizeError::MissingId),
        },
        _ => Err(NormalizeError::MissingId),
    }
}

/// Interpret a payload as a list of records.
///
/// Accepts a bare JSON array or an object carrying the list under one of
/// `keys` (endpoints wrap their lists in `products`, `orders`, `history`,
/// ... alongside pagination metadata).
pub(crate) fn records<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Value::Array(items) = body {
        return Some(items);
    }
    let obj = body.as_object()?;
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(Value::as_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn payload_unwraps_envelope_or_passes_through() {
        let enveloped = json!({"data": {"id": "p1"}, "message": "Success"});
        assert_eq!(payload(&enveloped), &json!({"id": "p1"}));

        let bare = json!({"id": "p1"});
        assert_eq!(payload(&bare), &bare);
    }

    #[test]
    fn chain_skips_null_entries() {
        let fields = obj(json!({"title": null, "name": "Widget"}));
        assert_eq!(
            text(&fields, &["title", "name"], "title").expect("chain"),
            Some("Widget".to_owned())
        );
    }

    #[test]
    fn number_parses_numeric_strings_but_not_garbage() {
        let fields = obj(json!({"price": "19.99"}));
        let parsed = number(&fields, &["price"], "price").expect("numeric string");
        assert_eq!(parsed, Some(19.99));

        let fields = obj(json!({"price": "not-a-price"}));
        assert!(number(&fields, &["price"], "price").is_err());

        let fields = obj(json!({}));
        assert_eq!(number(&fields, &["price"], "price").expect("absent"), None);
    }

    #[test]
    fn count_rejects_negatives_and_fractions() {
        assert!(count(&obj(json!({"reviews": -3})), &["reviews"], "reviews").is_err());
        assert!(count(&obj(json!({"reviews": 2.5})), &["reviews"], "reviews").is_err());
        assert_eq!(
            count(&obj(json!({"reviews": 7})), &["reviews"], "reviews").expect("count"),
            Some(7)
        );
    }

    #[test]
    fn id_accepts_string_number_and_oid_objects() {
        assert_eq!(id(&obj(json!({"id": "p1"})), &["id", "_id"]).expect("id"), "p1");
        assert_eq!(id(&obj(json!({"_id": 42})), &["id", "_id"]).expect("id"), "42");
        assert_eq!(
            id(&obj(json!({"_id": {"$oid": "64f1c0"}})), &["id", "_id"]).expect("id"),
            "64f1c0"
        );
    }

    #[test]
    fn id_fails_loudly_when_absent_or_empty() {
        assert!(matches!(
            id(&obj(json!({})), &["id", "_id"]),
            Err(NormalizeError::MissingId)
        ));
        assert!(matches!(
            id(&obj(json!({"id": ""})), &["id", "_id"]),
            Err(NormalizeError::MissingId)
        ));
    }

    #[test]
    fn records_accepts_bare_arrays_and_keyed_lists() {
        let bare = json!([{"id": "p1"}]);
        assert_eq!(records(&bare, &["products"]).map(Vec::len), Some(1));

        let keyed = json!({"products": [{"id": "p1"}, {"id": "p2"}], "pagination": {}});
        assert_eq!(records(&keyed, &["products"]).map(Vec::len), Some(2));

        assert!(records(&json!({"other": 1}), &["products"]).is_none());
    }
}
