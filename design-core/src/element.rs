//! Design elements - logos and text placed on the canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CanvasPoint;

/// Smallest width or height any element may have, in pixels.
pub const MIN_ELEMENT_SIZE: f32 = 20.0;

/// Edge length of a freshly added logo.
pub const DEFAULT_LOGO_SIZE: f32 = 100.0;

/// Width of a freshly added text box.
pub const DEFAULT_TEXT_WIDTH: f32 = 200.0;

/// Height of a freshly added text box.
pub const DEFAULT_TEXT_HEIGHT: f32 = 40.0;

/// Font size used when the user does not pick one.
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Text color used when the user does not pick one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Rotation applied by one press of the rotate controls.
pub const ROTATION_STEP_DEGREES: f32 = 5.0;

/// Width change applied by one press of the resize controls.
pub const RESIZE_STEP: f32 = 10.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an element ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content an element carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// An uploaded image.
    Logo {
        /// Image data as a `data:` URL.
        src: String,
    },

    /// A free-form text label.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color as hex.
        color: String,
    },
}

/// Position, size and rotation in canvas-local pixels.
///
/// Origin is the canvas top-left, x grows right, y grows down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Clockwise rotation about the element center, in degrees.
    ///
    /// Not normalized; repeated rotation may grow past ±360.
    pub rotation_degrees: f32,
}

impl Geometry {
    /// Create an unrotated geometry.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
        }
    }

    /// Center point of the unrotated rectangle.
    #[must_use]
    pub fn center(&self) -> CanvasPoint {
        CanvasPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether both dimensions satisfy [`MIN_ELEMENT_SIZE`].
    #[must_use]
    pub fn meets_min_size(&self) -> bool {
        self.width >= MIN_ELEMENT_SIZE && self.height >= MIN_ELEMENT_SIZE
    }
}

/// Partial geometry update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryPatch {
    /// New x position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New y position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// New width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// New height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// New rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_degrees: Option<f32>,
}

impl GeometryPatch {
    /// Patch that moves an element to `(x, y)`.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that replaces every field with those of `geometry`.
    #[must_use]
    pub fn full(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            rotation_degrees: Some(geometry.rotation_degrees),
        }
    }

    /// Return `geometry` with the given fields replaced.
    #[must_use]
    pub fn apply_to(&self, geometry: Geometry) -> Geometry {
        Geometry {
            x: self.x.unwrap_or(geometry.x),
            y: self.y.unwrap_or(geometry.y),
            width: self.width.unwrap_or(geometry.width),
            height: self.height.unwrap_or(geometry.height),
            rotation_degrees: self.rotation_degrees.unwrap_or(geometry.rotation_degrees),
        }
    }
}

/// Pixel size of the drawing surface.
///
/// Measured once from the rendered container and fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top-left origin that centers a box of the given size on the canvas.
    #[must_use]
    pub fn centered(&self, width: f32, height: f32) -> CanvasPoint {
        CanvasPoint::new(
            self.width / 2.0 - width / 2.0,
            self.height / 2.0 - height / 2.0,
        )
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(500.0, 600.0)
    }
}

/// A placed element with content and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, stable for the element's lifetime.
    pub id: ElementId,
    /// Element content.
    pub kind: ElementKind,
    /// Position, size and rotation.
    pub geometry: Geometry,
}

impl Element {
    /// Create a new element with a fresh id.
    #[must_use]
    pub fn new(kind: ElementKind, geometry: Geometry) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            geometry,
        }
    }

    /// Create a logo at its default size, centered on `canvas`.
    #[must_use]
    pub fn logo(src: impl Into<String>, canvas: CanvasSize) -> Self {
        let origin = canvas.centered(DEFAULT_LOGO_SIZE, DEFAULT_LOGO_SIZE);
        Self::new(
            ElementKind::Logo { src: src.into() },
            Geometry::new(origin.x, origin.y, DEFAULT_LOGO_SIZE, DEFAULT_LOGO_SIZE),
        )
    }

    /// Create a text box at its default size, centered on `canvas`.
    #[must_use]
    pub fn text(
        content: impl Into<String>,
        font_size: f32,
        color: impl Into<String>,
        canvas: CanvasSize,
    ) -> Self {
        let origin = canvas.centered(DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT);
        Self::new(
            ElementKind::Text {
                content: content.into(),
                font_size,
                color: color.into(),
            },
            Geometry::new(origin.x, origin.y, DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT),
        )
    }

    /// Set the geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Whether this element is an image whose aspect ratio is locked.
    #[must_use]
    pub fn is_logo(&self) -> bool {
        matches!(self.kind, ElementKind::Logo { .. })
    }

    /// Height over width.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.geometry.height / self.geometry.width
    }

    /// Check if a canvas-local point falls within the element's hit region.
    ///
    /// The hit region is the unrotated layout rectangle.
    #[must_use]
    pub fn contains_point(&self, point: CanvasPoint) -> bool {
        let g = &self.geometry;
        point.x >= g.x && point.x <= g.x + g.width && point.y >= g.y && point.y <= g.y + g.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_is_centered() {
        let logo = Element::logo("data:image/png;base64,AAAA", CanvasSize::new(500.0, 600.0));
        assert_eq!(logo.geometry, Geometry::new(200.0, 250.0, 100.0, 100.0));
        assert!(logo.is_logo());
    }

    #[test]
    fn test_text_is_centered() {
        let text = Element::text("Hi", 24.0, "#ff0000", CanvasSize::new(500.0, 600.0));
        assert_eq!(text.geometry, Geometry::new(150.0, 280.0, 200.0, 40.0));
        assert!(!text.is_logo());
    }

    #[test]
    fn test_patch_replaces_only_given_fields() {
        let g = Geometry::new(10.0, 20.0, 30.0, 40.0);
        let patched = GeometryPatch::position(1.0, 2.0).apply_to(g);
        assert_eq!(patched, Geometry::new(1.0, 2.0, 30.0, 40.0));

        let rotated = GeometryPatch {
            rotation_degrees: Some(15.0),
            ..GeometryPatch::default()
        }
        .apply_to(g);
        assert!((rotated.rotation_degrees - 15.0).abs() < f32::EPSILON);
        assert!((rotated.x - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_contains_point_edges() {
        let e = Element::logo("x", CanvasSize::new(500.0, 600.0));
        assert!(e.contains_point(CanvasPoint::new(200.0, 250.0)));
        assert!(e.contains_point(CanvasPoint::new(300.0, 350.0)));
        assert!(!e.contains_point(CanvasPoint::new(199.0, 250.0)));
        assert!(!e.contains_point(CanvasPoint::new(250.0, 351.0)));
    }

    #[test]
    fn test_element_id_roundtrip() {
        let id = ElementId::new();
        let parsed = ElementId::parse(&id.to_string()).expect("valid uuid");
        assert_eq!(id, parsed);
        assert!(ElementId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_kind_serializes_tagged() {
        let kind = ElementKind::Logo {
            src: "data:image/png;base64,AA".to_string(),
        };
        let json = serde_json::to_value(&kind).expect("serialize");
        assert_eq!(json["type"], "logo");
        assert_eq!(json["data"]["src"], "data:image/png;base64,AA");
    }
}
