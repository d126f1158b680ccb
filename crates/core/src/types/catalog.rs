//! Canonical catalog types: products and the session state built on them.
//!
//! These types provide a clean, uniform model separate from the raw backend
//! payloads, which use several incompatible field namings. Construction from
//! raw payloads happens in the client crate's normalizer; once built, a
//! `Product` is never mutated - updated data is re-fetched, not patched.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product in the canonical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable backend identifier. Non-empty by construction.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the store currency. Never negative.
    pub price: f64,
    /// Primary image URL, empty when the backend has none.
    pub image: String,
    /// Average review rating in `[0, 5]`.
    pub rating: f64,
    /// Number of reviews behind `rating`.
    pub review_count: u32,
    /// Plain-text description.
    pub description: String,
    /// Category name, empty when uncategorized.
    pub category: String,
    /// Derived from the backend's stock count (`stock > 0`).
    pub in_stock: bool,
}

/// One line of a cart: a product snapshot with a quantity.
///
/// `snapshot` is the product as it looked when the line was created. It is
/// deliberately not refreshed from later catalog fetches, so a price change
/// mid-session does not silently reprice what the shopper already added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product state captured at add time.
    pub snapshot: Product,
    /// Units of the product. Always at least 1; a line whose quantity would
    /// drop to 0 is removed instead.
    pub quantity: u32,
}

impl CartLine {
    /// Create a line from an add-time snapshot.
    #[must_use]
    pub fn new(snapshot: Product, quantity: u32) -> Self {
        Self {
            product_id: snapshot.id.clone(),
            snapshot,
            quantity,
        }
    }

    /// Price of this line: snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.snapshot.price * f64::from(self.quantity)
    }
}

/// A saved product on the wishlist.
///
/// Membership is a set over `product_id`; the snapshot exists so the list
/// can render without re-fetching the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// Product this entry refers to.
    pub product_id: ProductId,
    /// Product state captured when the entry was added.
    pub snapshot: Product,
}

impl WishlistEntry {
    /// Create an entry from an add-time snapshot.
    #[must_use]
    pub fn new(snapshot: Product) -> Self {
        Self {
            product_id: snapshot.id.clone(),
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Widget".to_owned(),
            price: 19.99,
            image: String::new(),
            rating: 4.0,
            review_count: 12,
            description: "A widget".to_owned(),
            category: "tools".to_owned(),
            in_stock: true,
        }
    }

    #[test]
    fn cart_line_total_scales_with_quantity() {
        let line = CartLine::new(widget(), 3);
        assert!((line.line_total() - 59.97).abs() < 1e-9);
        assert_eq!(line.product_id, ProductId::new("p1"));
    }

    #[test]
    fn wishlist_entry_keys_on_product_id() {
        let entry = WishlistEntry::new(widget());
        assert_eq!(entry.product_id, entry.snapshot.id);
    }

    #[test]
    fn product_serde_round_trip() {
        let product = widget();
        let json = serde_json::to_value(&product).expect("serialize");
        assert_eq!(json["review_count"], 12);
        let back: Product = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, product);
    }
}
