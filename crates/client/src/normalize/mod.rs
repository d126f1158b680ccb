//! Normalization of backend payloads into the canonical model.
//!
//! The backends answer in several incompatible shapes: enveloped or bare,
//! `id` or `_id` or Mongo extended JSON, `title` or `name`, `price` or
//! `amount`, and so on. All of it funnels through this module, so the
//! fallback-chain policy lives (and is tested) in exactly one place instead
//! of being re-implemented per page.
//!
//! Every function here is pure: no I/O, no clock, no global state.
//! Normalizing an already-normalized record yields the same record.
//!
//! List normalization contains errors per record: one malformed product must
//! not blank an entire catalog page, so the bad record is logged and dropped
//! while the rest of the list survives.

mod identity;
mod order;
mod product;
mod value;

pub use identity::normalize_identity;
pub use order::{normalize_order, normalize_order_list, normalize_view_history};
pub use product::{normalize_product, normalize_product_list};
pub use value::payload;

use thiserror::Error;

/// A payload that is present but malformed.
///
/// Merely *missing* optional fields never produce this error - they fall
/// through their chains to defaults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// No id source (`id`, `_id`, nested object id) is present, or all of
    /// them are empty. Ids are never fabricated.
    #[error("payload has no usable id")]
    MissingId,

    /// A field is present but has the wrong shape (e.g. an unparsable
    /// numeric string).
    #[error("field `{field}` is present but not a {expected}")]
    InvalidField {
        /// Canonical name of the offending field.
        field: &'static str,
        /// What the field was expected to be.
        expected: &'static str,
    },

    /// An order status outside the closed status set.
    #[error("unknown order status `{0}`")]
    UnknownStatus(String),

    /// The payload is not a JSON object at all.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A structurally invalid email address on an identity payload.
    #[error(transparent)]
    InvalidEmail(#[from] shophub_core::EmailError),
}

/// Short description of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
