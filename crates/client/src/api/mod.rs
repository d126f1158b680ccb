//! ShopHub backend API client.
//!
//! Uses `reqwest` for HTTP with a per-request terminal timeout. Catalog
//! reads are cached with `moka` (5-minute TTL); anything user-scoped or
//! mutable is never cached. Every response funnels through one `execute`
//! helper so transport classification and status mapping live in one place.
//!
//! The client is also the production implementation of [`AuthBackend`], the
//! seam the identity store consumes; tests drive the session through stub
//! implementations of the same trait.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use shophub_core::{CartLine, IdentityId, Order, Product, ProductId, ViewEntry};

use crate::config::ClientConfig;
use crate::normalize::{
    self, normalize_order, normalize_order_list, normalize_product, normalize_product_list,
    normalize_view_history, NormalizeError,
};
use crate::session::identity::{Credentials, NewAccount, TokenHandle};

const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);
const CATALOG_CACHE_CAPACITY: u64 = 1000;

/// Errors from backend requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Timeout or connectivity loss: recoverable, the UI keeps its
    /// last-known-good data and offers a retry.
    #[error("transient network error: {0}")]
    Transient(#[source] reqwest::Error),

    /// Any other transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The backend rejected the request's credentials or token. The caller
    /// must force a logout when this happens on a token-gated request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested entity does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message from the backend's `{"error": ...}` body, or a body
        /// excerpt.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A single-entity payload failed normalization.
    #[error("malformed payload: {0}")]
    Malformed(#[from] NormalizeError),

    /// A request path failed to resolve against the base URL.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The auth backend's `{ user, access_token }` payload, pre-extraction.
///
/// The identity store normalizes `user` into an
/// [`Identity`](shophub_core::Identity); keeping it raw here means the
/// fallback-chain policy stays in the normalizer.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    /// Raw `user` object from the response, `Null` when absent.
    pub user: Value,
    /// Issued bearer token (`access_token`, falling back to `token`).
    pub access_token: Option<String>,
}

impl AuthPayload {
    /// Extract the payload from a login/register response body, enveloped
    /// or bare.
    #[must_use]
    pub fn from_response(raw: &Value) -> Self {
        let body = normalize::payload(raw);
        Self {
            user: body.get("user").cloned().unwrap_or(Value::Null),
            access_token: body
                .get("access_token")
                .or_else(|| body.get("token"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// The auth backend as the identity store sees it.
///
/// No automatic retry: a failed login or register surfaces immediately and
/// retrying is the shopper's decision.
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a `{ user, access_token }` payload.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthPayload, ApiError>> + Send;

    /// Create an account and log it in.
    fn register(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<AuthPayload, ApiError>> + Send;
}

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// Client for the ShopHub backend.
///
/// Cheaply cloneable via `Arc`; one instance serves the whole session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    token: TokenHandle,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// `token` is the handle shared with the identity store: whatever token
    /// is current at request time gets attached as a bearer header.
    #[must_use]
    pub fn new(config: &ClientConfig, token: TokenHandle) -> Self {
        let cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                timeout: config.request_timeout,
                token,
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode the JSON body.
    ///
    /// Applies the timeout, attaches the current bearer token, and maps
    /// failure shapes: timeout/connect to [`ApiError::Transient`], 401/403
    /// to [`ApiError::Unauthorized`], 404 to [`ApiError::NotFound`],
    /// anything else non-2xx to [`ApiError::Backend`].
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let mut request = request.timeout(self.inner.timeout);
        if let Some(token) = self.inner.token.get() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(error_for_status(status, &text));
        }

        serde_json::from_str(&text).map_err(|error| {
            tracing::error!(
                %error,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse backend response"
            );
            ApiError::Parse(error)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product catalog, normalized. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Transport and backend failures; malformed records inside the list
    /// are dropped, not errors.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get("products").await {
            debug!("cache hit for products");
            return Ok(products);
        }

        let value = self.execute(self.inner.http.get(self.url("/products")?)).await?;
        let products = normalize_product_list(&value);

        self.inner
            .cache
            .insert("products".to_owned(), CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch one product by id. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the backend has no such product, plus
    /// the usual transport failures; a malformed body is
    /// [`ApiError::Malformed`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let path = format!("/products/{product_id}");
        let value = self.execute(self.inner.http.get(self.url(&path)?)).await?;
        let product = normalize_product(&value)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Fetch recommendations for a shopper. Personalized, so never cached.
    ///
    /// # Errors
    ///
    /// Transport and backend failures.
    #[instrument(skip(self), fields(identity_id = %identity_id))]
    pub async fn recommendations(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Vec<Product>, ApiError> {
        let path = format!("/recommendations/{identity_id}");
        let value = self.execute(self.inner.http.get(self.url(&path)?)).await?;
        Ok(normalize_product_list(&value))
    }

    // =========================================================================
    // Orders & history (token-gated, never cached)
    // =========================================================================

    /// Fetch the logged-in shopper's orders.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] on a stale token (the caller must force
    /// logout), plus the usual transport failures.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let value = self.execute(self.inner.http.get(self.url("/orders")?)).await?;
        Ok(normalize_order_list(&value))
    }

    /// Fetch a shopper's product-view history.
    ///
    /// # Errors
    ///
    /// As for [`Self::orders`].
    #[instrument(skip(self), fields(identity_id = %identity_id))]
    pub async fn view_history(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Vec<ViewEntry>, ApiError> {
        let path = format!("/users/{identity_id}/history");
        let value = self.execute(self.inner.http.get(self.url(&path)?)).await?;
        Ok(normalize_view_history(&value))
    }

    /// Place an order from the current cart lines.
    ///
    /// This is the thin order-creation call only; payment and checkout flow
    /// live entirely on the backend.
    ///
    /// # Errors
    ///
    /// Transport and backend failures; a malformed order echo is
    /// [`ApiError::Malformed`].
    #[instrument(skip(self, lines))]
    pub async fn place_order(&self, lines: &[CartLine], total: f64) -> Result<Order, ApiError> {
        let items: Vec<Value> = lines
            .iter()
            .map(|line| {
                serde_json::json!({
                    "product_id": line.product_id,
                    "product_name": line.snapshot.title,
                    "quantity": line.quantity,
                    "price": line.snapshot.price,
                })
            })
            .collect();
        let body = serde_json::json!({ "items": items, "total_amount": total });

        let value = self
            .execute(self.inner.http.post(self.url("/orders")?).json(&body))
            .await?;
        Ok(normalize_order(&value)?)
    }

    // =========================================================================
    // Cache management
    // =========================================================================

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl AuthBackend for ApiClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let value = self
            .execute(self.inner.http.post(self.url("/users/login")?).json(&body))
            .await?;
        Ok(AuthPayload::from_response(&value))
    }

    #[instrument(skip(self, account), fields(username = %account.username))]
    async fn register(&self, account: &NewAccount) -> Result<AuthPayload, ApiError> {
        let body = serde_json::json!({
            "username": account.username,
            "email": account.email,
            "password": account.password,
            "first_name": account.display_name,
        });
        let value = self
            .execute(self.inner.http.post(self.url("/users/register")?).json(&body))
            .await?;
        Ok(AuthPayload::from_response(&value))
    }
}

fn classify_transport(error: reqwest::Error) -> ApiError {
    if error.is_timeout() || error.is_connect() {
        ApiError::Transient(error)
    } else {
        ApiError::Http(error)
    }
}

fn error_for_status(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .map_or_else(
            || body.chars().take(200).collect::<String>(),
            str::to_owned,
        );

    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            ApiError::Unauthorized(message)
        }
        reqwest::StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_payload_unwraps_envelope_and_token_aliases() {
        let enveloped = json!({
            "data": { "user": { "id": "u1" }, "access_token": "jwt-a" },
            "message": "Success"
        });
        let payload = AuthPayload::from_response(&enveloped);
        assert_eq!(payload.user["id"], "u1");
        assert_eq!(payload.access_token.as_deref(), Some("jwt-a"));

        let bare = json!({ "user": { "id": "u2" }, "token": "jwt-b" });
        let payload = AuthPayload::from_response(&bare);
        assert_eq!(payload.access_token.as_deref(), Some("jwt-b"));
    }

    #[test]
    fn auth_payload_missing_user_degrades_to_null() {
        let payload = AuthPayload::from_response(&json!({ "access_token": "jwt" }));
        assert!(payload.user.is_null());
    }

    #[test]
    fn status_mapping_covers_the_taxonomy() {
        let unauthorized =
            error_for_status(reqwest::StatusCode::UNAUTHORIZED, r#"{"error":"Invalid credentials"}"#);
        assert!(matches!(unauthorized, ApiError::Unauthorized(m) if m == "Invalid credentials"));

        let not_found =
            error_for_status(reqwest::StatusCode::NOT_FOUND, r#"{"error":"Product not found"}"#);
        assert!(matches!(not_found, ApiError::NotFound(m) if m == "Product not found"));

        let server = error_for_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(server, ApiError::Backend { status: 500, message } if message == "boom"));
    }
}
