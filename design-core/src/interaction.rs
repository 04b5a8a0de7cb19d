//! Direct-manipulation state machine and geometry operators.
//!
//! ```text
//!            pointer-down on element
//!   ┌──────┐ ─────────────────────────▶ ┌──────────────────────────┐
//!   │ Idle │                            │ Dragging(id, grab_offset) │ ◀─┐ pointer-move
//!   └──────┘ ◀───────────────────────── └──────────────────────────┘ ──┘ (clamp + commit)
//!            pointer-up / pointer-leave
//! ```
//!
//! Only one element is ever mid-drag. A pointer-down while dragging ends the
//! current drag and re-targets to whatever is under the pointer.

use serde::{Deserialize, Serialize};

use crate::element::MIN_ELEMENT_SIZE;
use crate::{
    CanvasPoint, CanvasSize, EditorResult, Element, ElementId, ElementStore, Geometry,
    GeometryPatch, PointerEvent, PointerPhase,
};

/// Current phase of the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum InteractionPhase {
    /// No drag in progress.
    #[default]
    Idle,
    /// An element is following the pointer.
    Dragging {
        /// Element being dragged.
        element: ElementId,
        /// Pointer position minus element origin at the moment of press.
        grab_offset: CanvasPoint,
    },
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutcome {
    /// An element was selected and a drag started.
    Selected(ElementId),
    /// The dragged element was moved to a new (clamped) position.
    Moved {
        /// Element that moved.
        element: ElementId,
        /// Committed x position.
        x: f32,
        /// Committed y position.
        y: f32,
    },
    /// The drag ended; the last committed position stands.
    Released(ElementId),
    /// The event had no effect.
    Ignored,
}

/// Translates pointer events into element mutations.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    phase: InteractionPhase,
}

impl InteractionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, InteractionPhase::Dragging { .. })
    }

    /// Drop any drag that targets `id` (used when the element is removed).
    pub fn forget(&mut self, id: ElementId) {
        if matches!(self.phase, InteractionPhase::Dragging { element, .. } if element == id) {
            self.phase = InteractionPhase::Idle;
        }
    }

    /// Process one pointer event.
    ///
    /// # Errors
    ///
    /// Returns an error if committing a move to the store fails.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        canvas: CanvasSize,
        store: &mut ElementStore,
        selection: &mut Option<ElementId>,
    ) -> EditorResult<InteractionOutcome> {
        let local = event.local_position();

        match (event.phase, self.phase) {
            (PointerPhase::Down, _) => {
                if let InteractionPhase::Dragging { element, .. } = self.phase {
                    tracing::debug!("Pointer-down during drag of {element}, re-targeting");
                    self.phase = InteractionPhase::Idle;
                }

                let target = event
                    .target
                    .filter(|id| store.get(*id).is_some())
                    .or_else(|| store.element_at(local));
                let Some(element) = target.and_then(|id| store.get(id)) else {
                    return Ok(InteractionOutcome::Ignored);
                };

                let grab_offset = local - CanvasPoint::new(element.geometry.x, element.geometry.y);
                let id = element.id;
                *selection = Some(id);
                self.phase = InteractionPhase::Dragging {
                    element: id,
                    grab_offset,
                };
                tracing::debug!("Drag start on {id}, grab offset {grab_offset:?}");
                Ok(InteractionOutcome::Selected(id))
            }

            (PointerPhase::Move, InteractionPhase::Dragging { element, grab_offset }) => {
                let Some(current) = store.get(element) else {
                    tracing::debug!("Dragged element {element} vanished, ending drag");
                    self.phase = InteractionPhase::Idle;
                    return Ok(InteractionOutcome::Ignored);
                };

                let proposed = local - grab_offset;
                let (x, y) = clamp_position(proposed, current.geometry, canvas);
                store.update(element, GeometryPatch::position(x, y))?;
                Ok(InteractionOutcome::Moved { element, x, y })
            }

            (PointerPhase::Up | PointerPhase::Leave, InteractionPhase::Dragging { element, .. }) => {
                self.phase = InteractionPhase::Idle;
                tracing::debug!("Drag end on {element}");
                Ok(InteractionOutcome::Released(element))
            }

            (PointerPhase::Move | PointerPhase::Up | PointerPhase::Leave, InteractionPhase::Idle) => {
                Ok(InteractionOutcome::Ignored)
            }
        }
    }
}

/// Clamp a proposed origin so the element stays inside the canvas.
///
/// If the element is larger than the canvas on an axis, that axis resolves
/// to 0.
#[must_use]
pub fn clamp_position(proposed: CanvasPoint, geometry: Geometry, canvas: CanvasSize) -> (f32, f32) {
    (
        clamp_axis(proposed.x, canvas.width, geometry.width),
        clamp_axis(proposed.y, canvas.height, geometry.height),
    )
}

fn clamp_axis(proposed: f32, canvas_extent: f32, size: f32) -> f32 {
    proposed.min(canvas_extent - size).max(0.0)
}

/// Geometry after changing `element`'s width by `delta` pixels.
///
/// Width is bounded by `[20, canvas.width - x]`, the lower bound winning.
/// Logos scale height to keep their aspect ratio, and their lower width
/// bound rises so the height also stays at or above 20. Text keeps its
/// height. The upper bound ignores rotation.
#[must_use]
pub fn resized_geometry(element: &Element, delta: f32, canvas: CanvasSize) -> Geometry {
    let g = element.geometry;
    let is_logo = element.is_logo();

    let min_width = if is_logo {
        MIN_ELEMENT_SIZE.max(MIN_ELEMENT_SIZE * g.width / g.height)
    } else {
        MIN_ELEMENT_SIZE
    };
    let width = (g.width + delta).min(canvas.width - g.x).max(min_width);
    let height = if is_logo {
        (g.height * width / g.width).max(MIN_ELEMENT_SIZE)
    } else {
        g.height
    };

    Geometry { width, height, ..g }
}

/// Geometry after rotating by `delta` degrees. The angle is not normalized.
#[must_use]
pub fn rotated_geometry(geometry: Geometry, delta: f32) -> Geometry {
    Geometry {
        rotation_degrees: geometry.rotation_degrees + delta,
        ..geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanvasRect, ViewportPoint};

    const RECT: CanvasRect = CanvasRect {
        left: 100.0,
        top: 50.0,
        width: 500.0,
        height: 600.0,
    };

    fn canvas() -> CanvasSize {
        CanvasSize::new(500.0, 600.0)
    }

    /// Viewport point for a canvas-local position.
    fn at(x: f32, y: f32) -> ViewportPoint {
        ViewportPoint::new(x + RECT.left, y + RECT.top)
    }

    fn setup() -> (InteractionController, ElementStore, ElementId) {
        let mut store = ElementStore::new();
        let id = store.add(Element::logo("data:image/png;base64,AA", canvas()));
        (InteractionController::new(), store, id)
    }

    #[test]
    fn test_down_selects_and_records_offset() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;

        let outcome = ctl
            .handle(&PointerEvent::down(at(230.0, 270.0), RECT), canvas(), &mut store, &mut selection)
            .expect("handle");

        assert_eq!(outcome, InteractionOutcome::Selected(id));
        assert_eq!(selection, Some(id));
        assert_eq!(
            ctl.phase(),
            InteractionPhase::Dragging {
                element: id,
                grab_offset: CanvasPoint::new(30.0, 20.0),
            }
        );
    }

    #[test]
    fn test_move_keeps_grab_offset() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;
        ctl.handle(&PointerEvent::down(at(230.0, 270.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");

        let outcome = ctl
            .handle(&PointerEvent::moved(at(240.0, 290.0), RECT), canvas(), &mut store, &mut selection)
            .expect("move");

        assert_eq!(
            outcome,
            InteractionOutcome::Moved {
                element: id,
                x: 210.0,
                y: 270.0,
            }
        );
    }

    #[test]
    fn test_drag_clamps_to_origin() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;
        // Grab at the element's corner so the proposed origin equals the pointer.
        ctl.handle(&PointerEvent::down(at(200.0, 250.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");
        ctl.handle(&PointerEvent::moved(at(-50.0, -50.0), RECT), canvas(), &mut store, &mut selection)
            .expect("move");
        ctl.handle(&PointerEvent::up(at(-50.0, -50.0), RECT), canvas(), &mut store, &mut selection)
            .expect("up");

        let g = store.get(id).expect("exists").geometry;
        assert_eq!((g.x, g.y), (0.0, 0.0));
        assert_eq!(ctl.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn test_drag_clamps_to_far_edge() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;
        ctl.handle(&PointerEvent::down(at(200.0, 250.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");
        ctl.handle(&PointerEvent::moved(at(900.0, 900.0), RECT), canvas(), &mut store, &mut selection)
            .expect("move");

        let g = store.get(id).expect("exists").geometry;
        assert_eq!((g.x, g.y), (400.0, 500.0));
    }

    #[test]
    fn test_oversized_element_clamps_to_zero() {
        let g = Geometry::new(0.0, 0.0, 800.0, 900.0);
        let (x, y) = clamp_position(CanvasPoint::new(120.0, -30.0), g, canvas());
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_leave_ends_drag() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;
        ctl.handle(&PointerEvent::down(at(210.0, 260.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");

        let outcome = ctl
            .handle(&PointerEvent::leave(at(600.0, 10.0), RECT), canvas(), &mut store, &mut selection)
            .expect("leave");
        assert_eq!(outcome, InteractionOutcome::Released(id));

        // Moves after release do nothing.
        let outcome = ctl
            .handle(&PointerEvent::moved(at(10.0, 10.0), RECT), canvas(), &mut store, &mut selection)
            .expect("move");
        assert_eq!(outcome, InteractionOutcome::Ignored);
        assert_eq!(store.get(id).expect("exists").geometry.x, 200.0);
    }

    #[test]
    fn test_down_on_empty_area_is_ignored() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = Some(id);

        let outcome = ctl
            .handle(&PointerEvent::down(at(5.0, 5.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");

        assert_eq!(outcome, InteractionOutcome::Ignored);
        assert_eq!(selection, Some(id));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_down_while_dragging_retargets() {
        let (mut ctl, mut store, first) = setup();
        let second = store.add(
            Element::text("Hi", 24.0, "#000000", canvas())
                .with_geometry(Geometry::new(0.0, 0.0, 100.0, 40.0)),
        );
        let mut selection = None;

        ctl.handle(&PointerEvent::down(at(210.0, 260.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down first");
        ctl.handle(&PointerEvent::down(at(10.0, 10.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down second");

        assert_eq!(selection, Some(second));
        match ctl.phase() {
            InteractionPhase::Dragging { element, .. } => assert_eq!(element, second),
            InteractionPhase::Idle => panic!("expected a drag"),
        }
        assert_ne!(selection, Some(first));
    }

    #[test]
    fn test_forget_clears_matching_drag() {
        let (mut ctl, mut store, id) = setup();
        let mut selection = None;
        ctl.handle(&PointerEvent::down(at(210.0, 260.0), RECT), canvas(), &mut store, &mut selection)
            .expect("down");

        ctl.forget(ElementId::new());
        assert!(ctl.is_dragging());
        ctl.forget(id);
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_resize_logo_keeps_aspect() {
        let logo = Element::logo("x", canvas());
        let g = resized_geometry(&logo, 10.0, canvas());
        assert_eq!((g.width, g.height), (110.0, 110.0));
    }

    #[test]
    fn test_resize_text_keeps_height() {
        let text = Element::text("Hi", 24.0, "#000000", canvas());
        let g = resized_geometry(&text, 10.0, canvas());
        assert_eq!((g.width, g.height), (210.0, 40.0));
    }

    #[test]
    fn test_resize_bounded_by_canvas_right_edge() {
        let logo = Element::logo("x", canvas()).with_geometry(Geometry::new(450.0, 0.0, 40.0, 40.0));
        let g = resized_geometry(&logo, 30.0, canvas());
        assert_eq!((g.width, g.height), (50.0, 50.0));
    }

    #[test]
    fn test_resize_floor_for_wide_logo() {
        let logo = Element::logo("x", canvas()).with_geometry(Geometry::new(0.0, 0.0, 100.0, 50.0));
        let g = resized_geometry(&logo, -500.0, canvas());
        assert_eq!((g.width, g.height), (40.0, 20.0));
    }

    #[test]
    fn test_resize_floor_for_text() {
        let text = Element::text("Hi", 24.0, "#000000", canvas());
        let g = resized_geometry(&text, -500.0, canvas());
        assert_eq!((g.width, g.height), (20.0, 40.0));
    }

    #[test]
    fn test_rotation_is_not_normalized() {
        let mut g = Geometry::new(0.0, 0.0, 50.0, 50.0);
        for _ in 0..80 {
            g = rotated_geometry(g, 5.0);
        }
        assert!((g.rotation_degrees - 400.0).abs() < 1e-3);
        let g = rotated_geometry(Geometry::new(0.0, 0.0, 50.0, 50.0), -5.0);
        assert!((g.rotation_degrees + 5.0).abs() < f32::EPSILON);
    }
}
