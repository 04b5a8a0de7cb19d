//! # Design Core
//!
//! Editor model for placing logos and text over a product mock-up.
//! Pure data and state transitions; rendering and networking live in
//! sibling crates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 design-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Element Store   │  Interaction Controller  │
//! │  - Paint order   │  - Idle / Dragging       │
//! │  - Geometry      │  - Clamp on move         │
//! │                  │  - Resize / rotate       │
//! ├─────────────────────────────────────────────┤
//! │  Coordinate Mapper  │  Editor State         │
//! │  - Viewport→canvas  │  - Selection          │
//! │                     │  - Command dispatch   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Pointer input arrives as [`PointerEvent`] messages, is mapped to
//! canvas-local space by [`coords`], and drives the [`InteractionController`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod coords;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod interaction;
pub mod state;
pub mod store;
pub mod upload;
pub mod validation;

pub use coords::{CanvasPoint, CanvasRect, ViewportPoint};
pub use document::{DesignDocument, ElementDocument};
pub use element::{CanvasSize, Element, ElementId, ElementKind, Geometry, GeometryPatch};
pub use error::{EditorError, EditorResult};
pub use event::{EditorCommand, PointerEvent, PointerPhase};
pub use interaction::{InteractionController, InteractionOutcome, InteractionPhase};
pub use state::EditorState;
pub use store::ElementStore;
pub use upload::{LogoUpload, TextInput};

/// Design core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
