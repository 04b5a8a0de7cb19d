//! Viewport to canvas coordinate mapping.
//!
//! The canvas may scroll or reflow between pointer events, so the bounding
//! rectangle travels with every event and the mapping is recomputed each time.

use serde::{Deserialize, Serialize};

/// A point in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportPoint {
    /// X relative to the viewport's left edge.
    pub x: f32,
    /// Y relative to the viewport's top edge.
    pub y: f32,
}

impl ViewportPoint {
    /// Create a viewport point.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in canvas-local coordinates (origin at the canvas top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    /// X relative to the canvas's left edge.
    pub x: f32,
    /// Y relative to the canvas's top edge.
    pub y: f32,
}

impl CanvasPoint {
    /// Create a canvas point.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for CanvasPoint {
    type Output = CanvasPoint;

    fn sub(self, rhs: CanvasPoint) -> CanvasPoint {
        CanvasPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// On-screen bounding rectangle of the canvas, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CanvasRect {
    /// Create a canvas rectangle.
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a viewport point into this canvas's local space.
    #[must_use]
    pub fn to_local(&self, point: ViewportPoint) -> CanvasPoint {
        to_canvas_local(point, *self)
    }
}

/// Convert a viewport point to canvas-local coordinates.
///
/// Points outside the rectangle map to negative or out-of-range values; no
/// clamping happens here.
#[must_use]
pub fn to_canvas_local(point: ViewportPoint, rect: CanvasRect) -> CanvasPoint {
    CanvasPoint::new(point.x - rect.left, point.y - rect.top)
}
