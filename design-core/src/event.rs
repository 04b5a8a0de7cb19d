//! Messages that drive the editor.
//!
//! Pointer callbacks and toolbar buttons are modeled as discrete values so
//! the state machine can be exercised without a UI.

use serde::{Deserialize, Serialize};

use crate::{CanvasPoint, CanvasRect, ElementId, LogoUpload, TextInput, ViewportPoint};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved (with or without a button held).
    Move,
    /// Button released.
    Up,
    /// Pointer left the canvas.
    Leave,
}

/// A pointer event in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Pointer position in viewport coordinates.
    pub position: ViewportPoint,
    /// Canvas bounding rectangle at the time of the event.
    pub canvas_rect: CanvasRect,
    /// Element under the pointer, if the host already hit-tested.
    ///
    /// When absent on `Down`, the controller hit-tests the store itself.
    #[serde(default)]
    pub target: Option<ElementId>,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create an event without a pre-computed target.
    #[must_use]
    pub fn new(phase: PointerPhase, position: ViewportPoint, canvas_rect: CanvasRect) -> Self {
        Self {
            phase,
            position,
            canvas_rect,
            target: None,
            timestamp_ms: 0,
        }
    }

    /// Pointer-down at `position`.
    #[must_use]
    pub fn down(position: ViewportPoint, canvas_rect: CanvasRect) -> Self {
        Self::new(PointerPhase::Down, position, canvas_rect)
    }

    /// Pointer-move to `position`.
    #[must_use]
    pub fn moved(position: ViewportPoint, canvas_rect: CanvasRect) -> Self {
        Self::new(PointerPhase::Move, position, canvas_rect)
    }

    /// Pointer-up at `position`.
    #[must_use]
    pub fn up(position: ViewportPoint, canvas_rect: CanvasRect) -> Self {
        Self::new(PointerPhase::Up, position, canvas_rect)
    }

    /// Pointer left the canvas at `position`.
    #[must_use]
    pub fn leave(position: ViewportPoint, canvas_rect: CanvasRect) -> Self {
        Self::new(PointerPhase::Leave, position, canvas_rect)
    }

    /// Set the hit-tested target element.
    #[must_use]
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    /// Pointer position in canvas-local space.
    #[must_use]
    pub fn local_position(&self) -> CanvasPoint {
        self.canvas_rect.to_local(self.position)
    }
}

/// Every user action the editor understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Add an uploaded image as a logo.
    AddLogo(LogoUpload),
    /// Add a text element.
    AddText(TextInput),
    /// Select an element.
    Select(ElementId),
    /// Clear the selection.
    ClearSelection,
    /// Delete the selected element.
    DeleteSelected,
    /// Resize the selected element's width by `delta` pixels.
    Resize {
        /// Signed width change in pixels.
        delta: f32,
    },
    /// Rotate the selected element by `delta` degrees.
    Rotate {
        /// Signed rotation change in degrees.
        delta: f32,
    },
    /// Raw pointer input.
    Pointer(PointerEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_position_uses_event_rect() {
        let event = PointerEvent::down(
            ViewportPoint::new(150.0, 220.0),
            CanvasRect::new(100.0, 200.0, 500.0, 600.0),
        );
        assert_eq!(event.local_position(), CanvasPoint::new(50.0, 20.0));
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_value(EditorCommand::Rotate { delta: 5.0 }).expect("serialize");
        assert_eq!(json["command"], "rotate");
        assert_eq!(json["data"]["delta"], 5.0);

        let parsed: EditorCommand =
            serde_json::from_str(r#"{"command":"clear_selection"}"#).expect("deserialize");
        assert_eq!(parsed, EditorCommand::ClearSelection);
    }
}
