//! Order payload types and the submission assembler.
//!
//! Everything here is pure data shaping; network I/O lives in
//! [`crate::client`].

use std::collections::BTreeMap;
use std::str::FromStr;

use design_core::{CanvasSize, EditorState, Element};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OrderError, OrderResult};

/// Quantities per size label, e.g. `S = 2, M = 5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeQuantities(BTreeMap<String, u32>);

impl SizeQuantities {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a size, replacing any previous value.
    pub fn set(&mut self, size: impl Into<String>, quantity: u32) {
        self.0.insert(size.into(), quantity);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, size: impl Into<String>, quantity: u32) -> Self {
        self.set(size, quantity);
        self
    }

    /// Quantity for a size (zero if absent).
    #[must_use]
    pub fn get(&self, size: &str) -> u32 {
        self.0.get(size).copied().unwrap_or(0)
    }

    /// Sum over all sizes.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    /// Entries with a positive quantity, in label order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0
            .iter()
            .filter(|(_, q)| **q > 0)
            .map(|(s, q)| (s.as_str(), *q))
    }

    /// Require at least one positive quantity.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidQuantities`] if every size is zero.
    pub fn validate(&self) -> OrderResult<()> {
        if self.total() == 0 {
            return Err(OrderError::InvalidQuantities);
        }
        Ok(())
    }

    /// Copy without zero entries.
    #[must_use]
    pub fn positive_only(&self) -> Self {
        self.entries().map(|(s, q)| (s.to_string(), q)).collect()
    }
}

impl FromIterator<(String, u32)> for SizeQuantities {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One `SIZE=QTY` entry, as typed on a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeEntry {
    /// Size label.
    pub size: String,
    /// Quantity for that size.
    pub quantity: u32,
}

impl FromStr for SizeEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, quantity) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SIZE=QTY, got {s:?}"))?;
        let size = size.trim();
        if size.is_empty() {
            return Err(format!("missing size label in {s:?}"));
        }
        let quantity = quantity
            .trim()
            .parse()
            .map_err(|e| format!("bad quantity in {s:?}: {e}"))?;
        Ok(Self {
            size: size.to_string(),
            quantity,
        })
    }
}

impl FromIterator<SizeEntry> for SizeQuantities {
    fn from_iter<I: IntoIterator<Item = SizeEntry>>(iter: I) -> Self {
        iter.into_iter().map(|e| (e.size, e.quantity)).collect()
    }
}

/// Product as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Photo used as the faint background.
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    /// Unit price. Decimal columns arrive as strings (`"120.50"`).
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub price: Option<f64>,
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Option::<Price>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Price::Number(value)) => Ok(Some(value)),
        Some(Price::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Price::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid price {text:?}"))),
    }
}

/// Contact details of the person ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Full name.
    #[serde(rename = "customerName")]
    pub name: String,
    /// Email address.
    #[serde(rename = "customerEmail")]
    pub email: String,
    /// Phone number.
    #[serde(rename = "customerPhone")]
    pub phone: String,
    /// Delivery address.
    #[serde(rename = "customerAddress", default)]
    pub address: String,
}

/// Billing details, when an invoice is wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInfo {
    /// Company name on the invoice.
    #[serde(rename = "companyName")]
    pub company_name: String,
    /// Tax office.
    #[serde(rename = "taxOffice")]
    pub tax_office: String,
    /// Tax number.
    #[serde(rename = "taxNumber")]
    pub tax_number: String,
    /// Billing address.
    #[serde(rename = "invoiceAddress", default)]
    pub address: String,
}

/// Externally supplied order fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    /// Customer contact.
    pub customer: CustomerInfo,
    /// Optional billing details.
    pub invoice: Option<InvoiceInfo>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// The design part of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customizations {
    /// Elements in paint order.
    pub elements: Vec<Element>,
    /// Canvas dimensions the geometry refers to.
    pub canvas_size: CanvasSize,
    /// Flattened design as a PNG `data:` URL.
    pub rendered_image_data_url: String,
    /// Positive quantities per size.
    pub size_quantities: SizeQuantities,
}

/// Payload for the order-submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Product being customized.
    pub product_id: u64,
    /// Total quantity across sizes.
    pub quantity: u32,
    /// The design.
    pub customizations: Customizations,
    /// Unit price, if the catalog supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_price: Option<f64>,
    /// Customer contact.
    #[serde(flatten)]
    pub customer: CustomerInfo,
    /// Billing details.
    #[serde(flatten)]
    pub invoice: Option<InvoiceInfo>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Acknowledgement from the order collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Identifier of the created request, if returned.
    #[serde(default)]
    pub id: Option<u64>,
    /// Backend message, if any.
    #[serde(default)]
    pub message: Option<String>,
}

/// Packages editor state into an order payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionAssembler;

impl SubmissionAssembler {
    /// Bundle the design with its rendered image and size quantities.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidQuantities`] if no size has a positive
    /// quantity.
    pub fn assemble(
        state: &EditorState,
        rendered_image_data_url: String,
        sizes: &SizeQuantities,
    ) -> OrderResult<Customizations> {
        sizes.validate()?;
        Ok(Customizations {
            elements: state.elements().cloned().collect(),
            canvas_size: state.canvas(),
            rendered_image_data_url,
            size_quantities: sizes.positive_only(),
        })
    }

    /// Combine a design with product and customer fields.
    #[must_use]
    pub fn build_order(
        product_id: u64,
        product_price: Option<f64>,
        customizations: Customizations,
        details: OrderDetails,
    ) -> OrderRequest {
        let notes = details.notes.filter(|n| !n.trim().is_empty());
        OrderRequest {
            product_id,
            quantity: customizations.size_quantities.total(),
            customizations,
            product_price,
            customer: details.customer,
            invoice: details.invoice,
            notes,
        }
    }
}
