//! ShopHub client - session state and data normalization.
//!
//! The storefront UI is thin glue over this crate. It owns the three things
//! that actually have invariants:
//!
//! - **Session state**: the active [`Identity`](shophub_core::Identity) plus
//!   the cart and wishlist, persisted write-through and partitioned by
//!   [`Scope`](shophub_core::Scope) so identities never see each other's
//!   state.
//! - **Normalization**: backend endpoints answer in several incompatible
//!   shapes; the [`normalize`] module turns all of them into the canonical
//!   model from `shophub-core`, in exactly one place.
//! - **Derived views**: the [`catalog`] module filters and sorts the
//!   normalized product collection, purely and per keystroke.
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use shophub_client::api::ApiClient;
//! use shophub_client::config::ClientConfig;
//! use shophub_client::session::identity::TokenHandle;
//! use shophub_client::session::SessionContext;
//! use shophub_client::store::FileStore;
//!
//! let config = ClientConfig::from_env()?;
//! let token = TokenHandle::default();
//! let backend = Arc::new(ApiClient::new(&config, token.clone()));
//! let store = Arc::new(FileStore::new(&config.data_dir)?);
//!
//! let session = SessionContext::init(backend, store, token);
//! session.restore(); // pick up a persisted identity, if any
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod session;
pub mod store;

pub use error::{ClientError, Result};
pub use session::SessionContext;
