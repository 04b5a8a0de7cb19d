//! The design session: editor state plus its export and order flows.
//!
//! Export and submit take `&self` and snapshot the design before their first
//! await, so a caller can trigger them concurrently; the busy flag turns
//! every attempt after the first into [`Outcome::AlreadyInFlight`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use design_core::{EditorError, EditorState};
use design_renderer::image::normalize_background;
use design_renderer::{save_download, Composition, DesignExporter, ExportedFile};

use crate::client::{OrderSink, ProductCatalog};
use crate::error::{OrderError, OrderResult};
use crate::guard::BusyFlag;
use crate::payload::{OrderAck, OrderDetails, Product, SizeQuantities, SubmissionAssembler};

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Upper bound on a single export or submit.
    ///
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Result of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation ran to completion.
    Completed(T),
    /// Another export or submit was still running; nothing was done.
    AlreadyInFlight,
}

impl<T> Outcome<T> {
    /// The completed value, if any.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::AlreadyInFlight => None,
        }
    }
}

/// An editing session for one product.
pub struct DesignSession {
    state: EditorState,
    exporter: DesignExporter,
    catalog: Arc<dyn ProductCatalog>,
    sink: Arc<dyn OrderSink>,
    config: SessionConfig,
    busy: BusyFlag,
    product_id: Option<u64>,
    product: Option<Product>,
    background: Option<String>,
}

impl std::fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSession")
            .field("elements", &self.state.store().len())
            .field("product_id", &self.product_id)
            .field("has_background", &self.background.is_some())
            .field("busy", &self.busy.is_busy())
            .finish_non_exhaustive()
    }
}

impl DesignSession {
    /// Create a session around existing editor state.
    #[must_use]
    pub fn new(
        state: EditorState,
        exporter: DesignExporter,
        catalog: Arc<dyn ProductCatalog>,
        sink: Arc<dyn OrderSink>,
        config: SessionConfig,
    ) -> Self {
        Self {
            state,
            exporter,
            catalog,
            sink,
            config,
            busy: BusyFlag::new(),
            product_id: None,
            product: None,
            background: None,
        }
    }

    /// Editor state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Editor state for applying edits.
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    /// The busy flag, for disabling export and submit controls.
    #[must_use]
    pub fn busy(&self) -> &BusyFlag {
        &self.busy
    }

    /// Product being designed for.
    #[must_use]
    pub fn product_id(&self) -> Option<u64> {
        self.product_id
    }

    /// Product details, when the lookup succeeded.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// Background photo as a `data:` URL, when one was loaded.
    #[must_use]
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Look up the product and its photo.
    ///
    /// Never fails: a missing product or unreadable photo leaves the session
    /// without a background and editing continues.
    pub async fn load_product(&mut self, id: u64) {
        self.product_id = Some(id);
        self.product = None;
        self.background = None;

        let product = match self.catalog.product(id).await {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!("Product {id} lookup failed, continuing without background: {e}");
                return;
            }
        };

        if let Some(url) = product.image_url.as_deref().filter(|u| !u.is_empty()) {
            match self.fetch_background(url).await {
                Ok(data_url) => self.background = Some(data_url),
                Err(e) => tracing::warn!("Background for product {id} unavailable: {e}"),
            }
        }

        tracing::info!(
            "Loaded product {} ({}), background: {}",
            id,
            product.name,
            self.background.is_some()
        );
        self.product = Some(product);
    }

    async fn fetch_background(&self, url: &str) -> OrderResult<String> {
        let bytes = self.catalog.image_bytes(url).await?;
        let (max_w, max_h) = self.exporter.output_dimensions(self.state.canvas());
        Ok(normalize_background(&bytes, max_w, max_h)?)
    }

    fn composition(&self) -> Composition {
        Composition::from_state(&self.state).with_background(self.background.clone())
    }

    async fn bounded<T, F>(&self, operation: F) -> OrderResult<T>
    where
        F: Future<Output = OrderResult<T>>,
    {
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| OrderError::Timeout(limit))?,
            None => operation.await,
        }
    }

    /// Render the design and save it as a PNG download in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails, or the timeout elapses.
    pub async fn export_download(
        &self,
        dir: impl AsRef<Path>,
    ) -> OrderResult<Outcome<ExportedFile>> {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::debug!("Export ignored, another operation is in flight");
            return Ok(Outcome::AlreadyInFlight);
        };

        let composition = self.composition();
        let rendered = self
            .bounded(async {
                self.exporter
                    .render_png_async(composition)
                    .await
                    .map_err(OrderError::from)
            })
            .await?;
        let path = save_download(&rendered, dir, self.product_id)?;

        Ok(Outcome::Completed(ExportedFile {
            path,
            data_url: rendered.data_url(),
        }))
    }

    /// Render the design and submit it as an order.
    ///
    /// On failure the design is untouched and the flag is released, so the
    /// user can fix the problem and try again.
    ///
    /// # Errors
    ///
    /// Returns an error if no product is set, the quantities are invalid,
    /// rendering fails, the backend rejects the order, or the timeout elapses.
    pub async fn submit(
        &self,
        sizes: &SizeQuantities,
        details: OrderDetails,
    ) -> OrderResult<Outcome<OrderAck>> {
        let Some(_guard) = self.busy.try_acquire() else {
            tracing::debug!("Submit ignored, another operation is in flight");
            return Ok(Outcome::AlreadyInFlight);
        };

        let product_id = self
            .product_id
            .ok_or_else(|| EditorError::InvalidOperation("No product selected".to_string()))?;
        sizes.validate()?;

        let composition = self.composition();
        let rendered = self
            .bounded(async {
                self.exporter
                    .render_png_async(composition)
                    .await
                    .map_err(OrderError::from)
            })
            .await?;

        let customizations = SubmissionAssembler::assemble(&self.state, rendered.data_url(), sizes)?;
        let price = self.product.as_ref().and_then(|p| p.price);
        let order = SubmissionAssembler::build_order(product_id, price, customizations, details);

        let ack = self.bounded(self.sink.submit(&order)).await?;
        tracing::info!(
            "Submitted order for product {} ({} items), id {:?}",
            product_id,
            order.quantity,
            ack.id
        );
        Ok(Outcome::Completed(ack))
    }
}
