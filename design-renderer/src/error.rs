//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while compositing or exporting a design.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image resource could not be parsed or decoded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The SVG intermediate could not be rasterized.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Encoding the raster image failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Writing the exported file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The background rasterization task did not complete.
    #[error("Render task failed: {0}")]
    Join(String),
}
