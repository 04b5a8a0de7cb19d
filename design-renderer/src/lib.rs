//! # Design Renderer
//!
//! Flattens a design into a single raster image.
//!
//! ```text
//! Composition ──► SVG ──► usvg tree ──► tiny-skia pixmap ──► PNG
//!                                                             │
//!                                         file download ◄─────┤
//!                                         data: URL     ◄─────┘
//! ```
//!
//! Paint order: canvas color, faint product photo, then elements in store
//! order, each rotated about its own center.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;

pub use error::{RenderError, RenderResult};
pub use export::{
    download_file_name, save_download, Composition, DesignExporter, ExportConfig, ExportedFile,
    RenderedDesign,
};
