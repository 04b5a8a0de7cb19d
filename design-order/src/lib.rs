//! # Design Order
//!
//! Turns a finished design into an order.
//!
//! ```text
//! ┌──────────────┐   render    ┌──────────────────┐   POST    ┌─────────┐
//! │ EditorState  │ ──────────► │ SubmissionAssem- │ ────────► │ backend │
//! │ + sizes      │  data: URL  │ bler             │           │         │
//! └──────────────┘             └──────────────────┘           └─────────┘
//!        ▲                                                         │
//!        └──────────── product photo (GET /products/{id}) ─────────┘
//! ```
//!
//! [`DesignSession`] ties the pieces together behind a [`BusyFlag`] so
//! repeated clicks never produce duplicate exports or orders.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod guard;
pub mod payload;
pub mod session;

pub use client::{HttpBackend, OrderSink, ProductCatalog};
pub use error::{OrderError, OrderResult};
pub use guard::{BusyFlag, BusyGuard};
pub use payload::{
    CustomerInfo, Customizations, InvoiceInfo, OrderAck, OrderDetails, OrderRequest, Product,
    SizeEntry, SizeQuantities, SubmissionAssembler,
};
pub use session::{DesignSession, Outcome, SessionConfig};
