//! Product payload normalization.

use serde_json::Value;
use tracing::warn;

use shophub_core::{Product, ProductId};

use super::{kind_of, value, NormalizeError};

/// Normalize one raw product payload into the canonical [`Product`].
///
/// Field resolution per attribute, first present wins:
///
/// | attribute    | chain                                   | default |
/// |--------------|-----------------------------------------|---------|
/// | id           | `id` -> `_id` (string, number, `$oid`)  | error   |
/// | title        | `title` -> `name`                       | `""`    |
/// | price        | `price` -> `amount`                     | `0`     |
/// | image        | `image` -> `image_url` -> `imageUrl`    | `""`    |
/// | rating       | `rating` (clamped to `[0, 5]`)          | `0`     |
/// | review count | `review_count` -> `reviews`             | `0`     |
/// | description  | `description` -> `desc`                 | `""`    |
/// | category     | `category`                              | `""`    |
/// | in stock     | `in_stock` -> `stock_quantity`/`stock` > 0 | `false` |
///
/// Accepts the response envelope or a bare object. Idempotent: feeding a
/// serialized canonical product back in reproduces it.
///
/// # Errors
///
/// [`NormalizeError::MissingId`] when no id source is present, and
/// [`NormalizeError::InvalidField`] for present-but-malformed fields. A
/// *missing* optional field is never an error.
pub fn normalize_product(raw: &Value) -> Result<Product, NormalizeError> {
    let body = value::payload(raw);
    let obj = body
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(body)))?;

    let id = value::id(obj, &["id", "_id"])?;
    let price = value::number(obj, &["price", "amount"], "price")?.unwrap_or(0.0);
    if price < 0.0 {
        return Err(NormalizeError::InvalidField {
            field: "price",
            expected: "non-negative number",
        });
    }

    let rating = value::number(obj, &["rating"], "rating")?
        .unwrap_or(0.0)
        .clamp(0.0, 5.0);

    let in_stock = value::boolean(obj, &["in_stock"]).map_or_else(
        || -> Result<bool, NormalizeError> {
            let stock = value::count(obj, &["stock_quantity", "stock"], "stock_quantity")?;
            Ok(stock.unwrap_or(0) > 0)
        },
        Ok,
    )?;

    Ok(Product {
        id: ProductId::new(id),
        title: value::text(obj, &["title", "name"], "title")?.unwrap_or_default(),
        price,
        image: value::text(obj, &["image", "image_url", "imageUrl"], "image")?
            .unwrap_or_default(),
        rating,
        review_count: value::count(obj, &["review_count", "reviews"], "review_count")?
            .unwrap_or(0),
        description: value::text(obj, &["description", "desc"], "description")?
            .unwrap_or_default(),
        category: value::text(obj, &["category"], "category")?.unwrap_or_default(),
        in_stock,
    })
}

/// Normalize a product-list payload, dropping malformed records.
///
/// Accepts the envelope, a bare array, or an object carrying the list under
/// `products`, `recommendations`, or `items`. Each record that fails
/// normalization is logged and dropped; the rest of the list survives. A
/// payload with no recognizable list yields an empty result.
#[must_use]
pub fn normalize_product_list(raw: &Value) -> Vec<Product> {
    let body = value::payload(raw);
    let Some(records) = value::records(body, &["products", "recommendations", "items"]) else {
        warn!(payload_kind = kind_of(body), "product payload has no list");
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| match normalize_product(record) {
            Ok(product) => Some(product),
            Err(error) => {
                warn!(%error, "dropping malformed product record");
                None
            }
        })
        .collect()
}
