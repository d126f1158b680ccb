//! Core types for the ShopHub client.
//!
//! This module provides the canonical domain model plus type-safe wrappers
//! for common concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod identity;
pub mod order;
pub mod scope;
pub mod status;

pub use catalog::{CartLine, Product, WishlistEntry};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use order::{Order, OrderItem, ViewEntry};
pub use scope::Scope;
pub use status::OrderStatus;
