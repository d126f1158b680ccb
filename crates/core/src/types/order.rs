//! Order and browse-history projections.
//!
//! Orders are read-only: the client displays what the order backend reports
//! and never mutates them. Timestamps stay as the backend's ISO-8601 strings;
//! the client only ever displays or sorts them lexically.

use serde::{Deserialize, Serialize};

use crate::types::id::{OrderId, ProductId};
use crate::types::status::OrderStatus;
use crate::types::Product;

/// One item of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product that was ordered.
    pub product_id: ProductId,
    /// Product title as it was at order time.
    pub title: String,
    /// Units ordered.
    pub quantity: u32,
    /// Price per unit at order time.
    pub unit_price: f64,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Backend order identifier.
    pub id: OrderId,
    /// Creation timestamp (ISO-8601 string from the backend).
    pub created_at: String,
    /// Current fulfillment status.
    pub status: OrderStatus,
    /// Ordered items.
    pub items: Vec<OrderItem>,
    /// Order total as reported by the backend.
    pub total_amount: f64,
}

/// One entry of the shopper's product-view history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEntry {
    /// Backend identifier for the view event.
    pub id: String,
    /// Product that was viewed.
    pub product_id: ProductId,
    /// View timestamp (ISO-8601 string from the backend).
    pub viewed_at: String,
    /// How long the product page was open, in seconds.
    pub view_duration_secs: u32,
    /// Product details, when the backend joined them into the entry. Absent
    /// when the product has since been removed from the catalog.
    pub product: Option<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_serde_round_trip() {
        let order = Order {
            id: OrderId::new("o1"),
            created_at: "2026-01-03T10:15:00".to_owned(),
            status: OrderStatus::Shipped,
            items: vec![OrderItem {
                product_id: ProductId::new("p1"),
                title: "Widget".to_owned(),
                quantity: 2,
                unit_price: 19.99,
            }],
            total_amount: 39.98,
        };
        let json = serde_json::to_value(&order).expect("serialize");
        assert_eq!(json["status"], "shipped");
        let back: Order = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, order);
    }
}
