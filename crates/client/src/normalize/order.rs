//! Order and view-history payload normalization.

use serde_json::Value;
use tracing::warn;

use shophub_core::{Order, OrderId, OrderItem, OrderStatus, ProductId, ViewEntry};

use super::{kind_of, normalize_product, value, NormalizeError};

/// Normalize one raw order payload into the canonical [`Order`].
///
/// Chains: id as for products; `created_at` -> `date`; `total_amount` ->
/// `total`; `status` must be one of the closed status set (absent defaults
/// to `pending`, unknown strings are an error). Malformed items are dropped
/// per-record, the same containment rule as product lists.
///
/// # Errors
///
/// [`NormalizeError::MissingId`] without an id source,
/// [`NormalizeError::UnknownStatus`] for a status outside the closed set,
/// and [`NormalizeError::InvalidField`] for malformed numerics.
pub fn normalize_order(raw: &Value) -> Result<Order, NormalizeError> {
    let body = value::payload(raw);
    let obj = body
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(body)))?;

    let id = value::id(obj, &["id", "_id"])?;

    let status = match value::text(obj, &["status"], "status")? {
        None => OrderStatus::default(),
        Some(s) => s
            .parse::<OrderStatus>()
            .map_err(|_| NormalizeError::UnknownStatus(s))?,
    };

    let total_amount = value::number(obj, &["total_amount", "total"], "total_amount")?
        .unwrap_or(0.0);
    if total_amount < 0.0 {
        return Err(NormalizeError::InvalidField {
            field: "total_amount",
            expected: "non-negative number",
        });
    }

    let items = obj
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match normalize_order_item(item) {
                    Ok(item) => Some(item),
                    Err(error) => {
                        warn!(%error, order_id = %id, "dropping malformed order item");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Order {
        id: OrderId::new(id),
        created_at: value::text(obj, &["created_at", "date"], "created_at")?
            .unwrap_or_default(),
        status,
        items,
        total_amount,
    })
}

fn normalize_order_item(raw: &Value) -> Result<OrderItem, NormalizeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(raw)))?;

    Ok(OrderItem {
        product_id: ProductId::new(value::id(obj, &["product_id"])?),
        title: value::text(obj, &["product_name", "title"], "title")?.unwrap_or_default(),
        quantity: value::count(obj, &["quantity"], "quantity")?.unwrap_or(0),
        unit_price: value::number(obj, &["price", "unit_price"], "price")?.unwrap_or(0.0),
    })
}

/// Normalize an order-list payload, dropping malformed records.
#[must_use]
pub fn normalize_order_list(raw: &Value) -> Vec<Order> {
    let body = value::payload(raw);
    let Some(records) = value::records(body, &["orders", "items"]) else {
        warn!(payload_kind = kind_of(body), "order payload has no list");
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| match normalize_order(record) {
            Ok(order) => Some(order),
            Err(error) => {
                warn!(%error, "dropping malformed order record");
                None
            }
        })
        .collect()
}

/// Normalize a view-history payload, dropping malformed records.
///
/// History entries carry their own id, the viewed product's id, and - when
/// the backend joined it in - a nested product payload. A malformed nested
/// product degrades that entry's `product` to `None` rather than dropping
/// the entry: the view event itself is still real.
#[must_use]
pub fn normalize_view_history(raw: &Value) -> Vec<ViewEntry> {
    let body = value::payload(raw);
    let Some(records) = value::records(body, &["history", "items"]) else {
        warn!(payload_kind = kind_of(body), "history payload has no list");
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| match normalize_view_entry(record) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(%error, "dropping malformed history record");
                None
            }
        })
        .collect()
}

fn normalize_view_entry(raw: &Value) -> Result<ViewEntry, NormalizeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| NormalizeError::NotAnObject(kind_of(raw)))?;

    let product = obj.get("product").and_then(|nested| {
        normalize_product(nested)
            .map_err(|error| warn!(%error, "dropping malformed nested product on history entry"))
            .ok()
    });

    Ok(ViewEntry {
        id: value::id(obj, &["id", "_id"])?,
        product_id: ProductId::new(value::id(obj, &["product_id"])?),
        viewed_at: value::text(obj, &["viewed_at", "date"], "viewed_at")?.unwrap_or_default(),
        view_duration_secs: value::count(
            obj,
            &["view_duration", "view_duration_secs"],
            "view_duration",
        )?
        .unwrap_or(0),
        product,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_backend_order_shape() {
        let raw = json!({
            "id": "o1",
            "created_at": "2026-01-03T10:15:00",
            "status": "shipped",
            "total_amount": 39.98,
            "items": [
                { "product_id": "p1", "product_name": "Widget", "quantity": 2, "price": 19.99 }
            ]
        });
        let order = normalize_order(&raw).expect("normalizes");
        assert_eq!(order.id, OrderId::new("o1"));
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.items.len(), 1);
        let item = order.items.first().expect("one item");
        assert_eq!(item.title, "Widget");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn total_falls_back_to_short_name() {
        let raw = json!({ "id": "o1", "total": 12.5 });
        assert_eq!(normalize_order(&raw).expect("total").total_amount, 12.5);
    }

    #[test]
    fn absent_status_defaults_unknown_status_errors() {
        let absent = json!({ "id": "o1" });
        assert_eq!(
            normalize_order(&absent).expect("default").status,
            OrderStatus::Pending
        );

        let unknown = json!({ "id": "o1", "status": "refunded" });
        assert!(matches!(
            normalize_order(&unknown),
            Err(NormalizeError::UnknownStatus(s)) if s == "refunded"
        ));
    }

    #[test]
    fn malformed_items_are_dropped_not_fatal() {
        let raw = json!({
            "id": "o1",
            "items": [
                { "product_id": "p1", "quantity": 1, "price": 5.0 },
                { "quantity": 1, "price": 5.0 },
                { "product_id": "p3", "quantity": "many", "price": 5.0 },
            ]
        });
        let order = normalize_order(&raw).expect("order survives");
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn order_list_is_contained_per_record() {
        let raw = json!({
            "data": {
                "orders": [
                    { "id": "o1", "status": "pending" },
                    { "status": "pending" },
                    { "id": "o3", "status": "teleported" },
                ]
            }
        });
        let orders = normalize_order_list(&raw);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.first().expect("one order").id, OrderId::new("o1"));
    }

    #[test]
    fn history_entries_keep_events_with_broken_products() {
        let raw = json!({
            "data": {
                "history": [
                    {
                        "id": "v1",
                        "product_id": "p1",
                        "viewed_at": "2026-02-01T09:00:00",
                        "view_duration": 42,
                        "product": { "id": "p1", "name": "Widget" }
                    },
                    {
                        "id": "v2",
                        "product_id": "p2",
                        "product": { "name": "id went missing" }
                    },
                ]
            }
        });
        let history = normalize_view_history(&raw);
        assert_eq!(history.len(), 2);
        let (first, second) = (
            history.first().expect("v1"),
            history.get(1).expect("v2"),
        );
        assert_eq!(first.view_duration_secs, 42);
        assert!(first.product.is_some());
        assert!(second.product.is_none());
    }
}
