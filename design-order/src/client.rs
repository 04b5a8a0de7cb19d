//! Collaborator contracts and their HTTP implementation.
//!
//! The editor consumes a product lookup and produces order submissions.
//! Both are traits so the session can be driven against in-memory fakes;
//! [`HttpBackend`] speaks the REST backend's `{ success, data, message }`
//! envelope.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::{OrderError, OrderResult};
use crate::payload::{OrderAck, OrderRequest, Product};

/// Product lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the lookup fails.
    async fn product(&self, id: u64) -> OrderResult<Product>;

    /// Download the bytes behind a product image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be fetched.
    async fn image_bytes(&self, url: &str) -> OrderResult<Vec<u8>>;
}

/// Order submission.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Submit an order; resolves once the backend acknowledges it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or is unreachable.
    async fn submit(&self, order: &OrderRequest) -> OrderResult<OrderAck>;
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// REST client for the product and order endpoints.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    base: Url,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Create a client for the backend at `base_url` (e.g. `https://host/api`).
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidUrl`] if the URL is malformed or cannot
    /// carry a path, and [`OrderError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> OrderResult<Self> {
        let base = Url::parse(base_url).map_err(|e| OrderError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(OrderError::InvalidUrl(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("design-order/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient { http, base }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    fn endpoint(&self, segments: &[&str]) -> OrderResult<Url> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|()| OrderError::InvalidUrl(self.inner.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> OrderResult<ApiEnvelope<T>> {
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if status.is_success() && envelope.success => Ok(envelope),
            Ok(envelope) => {
                tracing::warn!("Backend refused request ({status}): {:?}", envelope.message);
                Err(OrderError::rejected(envelope.message))
            }
            Err(e) if status.is_success() => Err(OrderError::Json(e)),
            Err(_) => {
                tracing::warn!("Backend returned {status} with unreadable body");
                Err(OrderError::rejected(Some(format!(
                    "Server responded with {status}"
                ))))
            }
        }
    }
}

#[async_trait]
impl ProductCatalog for HttpBackend {
    async fn product(&self, id: u64) -> OrderResult<Product> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        tracing::debug!("Fetching product from {url}");

        let response = self.inner.http.get(url).send().await?;
        let envelope = Self::read_envelope::<Product>(response).await?;
        envelope
            .data
            .ok_or_else(|| OrderError::rejected(Some(format!("Product {id} not found"))))
    }

    async fn image_bytes(&self, url: &str) -> OrderResult<Vec<u8>> {
        // Relative image paths are served by the backend host.
        let url = self
            .inner
            .base
            .join(url)
            .map_err(|e| OrderError::InvalidUrl(e.to_string()))?;
        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl OrderSink for HttpBackend {
    async fn submit(&self, order: &OrderRequest) -> OrderResult<OrderAck> {
        let url = self.endpoint(&["custom-production-requests"])?;
        tracing::debug!(
            "Submitting order for product {} ({} items)",
            order.product_id,
            order.quantity
        );

        let response = self.inner.http.post(url).json(order).send().await?;
        let envelope = Self::read_envelope::<serde_json::Value>(response).await?;

        let id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("id"))
            .and_then(serde_json::Value::as_u64);
        Ok(OrderAck {
            id,
            message: envelope.message,
        })
    }
}
