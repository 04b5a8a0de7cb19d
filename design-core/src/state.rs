//! Editor state container.
//!
//! Holds the element store, the selection and the interaction phase in one
//! explicit value so every transition can be driven and inspected without a UI.

use crate::interaction::{resized_geometry, rotated_geometry};
use crate::validation::{validate_logo_upload, validate_text_input};
use crate::{
    CanvasSize, EditorCommand, EditorError, EditorResult, Element, ElementId, ElementStore,
    GeometryPatch, InteractionController, InteractionOutcome, InteractionPhase, LogoUpload,
    PointerEvent, TextInput,
};

/// The complete editor state.
#[derive(Debug, Clone)]
pub struct EditorState {
    canvas: CanvasSize,
    store: ElementStore,
    /// Reference into the store; never owns the element.
    selection: Option<ElementId>,
    controller: InteractionController,
    revision: u64,
}

impl EditorState {
    /// Create an empty editor for a canvas of the given size.
    #[must_use]
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            store: ElementStore::new(),
            selection: None,
            controller: InteractionController::new(),
            revision: 0,
        }
    }

    /// Restore an editor from previously stored elements.
    ///
    /// Nothing is selected afterwards.
    #[must_use]
    pub fn with_store(canvas: CanvasSize, store: ElementStore) -> Self {
        Self {
            store,
            ..Self::new(canvas)
        }
    }

    /// Canvas dimensions.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// The element store.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Elements in paint order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + Clone {
        self.store.list()
    }

    /// Currently selected element ID.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selection
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection.and_then(|id| self.store.get(id))
    }

    /// Current interaction phase.
    #[must_use]
    pub fn phase(&self) -> InteractionPhase {
        self.controller.phase()
    }

    /// Counter bumped on every observable change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add a logo from an uploaded file, centered and selected.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidInput`] if the file is not an image;
    /// the state is unchanged.
    pub fn add_logo(&mut self, upload: &LogoUpload) -> EditorResult<ElementId> {
        validate_logo_upload(upload)?;
        let element = Element::logo(upload.to_data_url(), self.canvas);
        tracing::debug!(
            "Adding logo from {:?} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );
        Ok(self.insert(element))
    }

    /// Add a text element, centered and selected.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidInput`] if the text is blank or its
    /// style is invalid; the state is unchanged.
    pub fn add_text(&mut self, input: &TextInput) -> EditorResult<ElementId> {
        validate_text_input(input)?;
        let element = Element::text(
            input.content.trim(),
            input.font_size,
            input.color.clone(),
            self.canvas,
        );
        Ok(self.insert(element))
    }

    fn insert(&mut self, element: Element) -> ElementId {
        let id = self.store.add(element);
        self.selection = Some(id);
        self.bump();
        id
    }

    /// Select an element, replacing any previous selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not in the store.
    pub fn select(&mut self, id: ElementId) -> EditorResult<()> {
        if self.store.get(id).is_none() {
            return Err(EditorError::ElementNotFound(id.to_string()));
        }
        if self.selection != Some(id) {
            self.selection = Some(id);
            self.bump();
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.bump();
        }
    }

    /// Remove an element by ID, clearing the selection if it pointed there.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove(&mut self, id: ElementId) -> EditorResult<Element> {
        let removed = self.store.remove(id)?;
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.controller.forget(id);
        self.bump();
        tracing::debug!("Removed element {id}");
        Ok(removed)
    }

    /// Delete the selected element.
    ///
    /// Returns `None` when nothing is selected.
    pub fn delete_selected(&mut self) -> Option<Element> {
        let id = self.selection?;
        self.remove(id).ok()
    }

    /// Change the selected element's width by `delta` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] if nothing is selected.
    pub fn resize_selected(&mut self, delta: f32) -> EditorResult<()> {
        let element = self.selected_element().ok_or(EditorError::NoSelection)?;
        let id = element.id;
        let next = resized_geometry(element, delta, self.canvas);
        self.store.update(
            id,
            GeometryPatch {
                width: Some(next.width),
                height: Some(next.height),
                ..GeometryPatch::default()
            },
        )?;
        self.bump();
        Ok(())
    }

    /// Rotate the selected element by `delta` degrees.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] if nothing is selected.
    pub fn rotate_selected(&mut self, delta: f32) -> EditorResult<()> {
        let element = self.selected_element().ok_or(EditorError::NoSelection)?;
        let id = element.id;
        let next = rotated_geometry(element.geometry, delta);
        self.store.update(
            id,
            GeometryPatch {
                rotation_degrees: Some(next.rotation_degrees),
                ..GeometryPatch::default()
            },
        )?;
        self.bump();
        Ok(())
    }

    /// Feed a pointer event to the interaction controller.
    ///
    /// # Errors
    ///
    /// Returns an error if a move cannot be committed to the store.
    pub fn dispatch(&mut self, event: &PointerEvent) -> EditorResult<InteractionOutcome> {
        let outcome =
            self.controller
                .handle(event, self.canvas, &mut self.store, &mut self.selection)?;
        if outcome != InteractionOutcome::Ignored {
            self.bump();
        }
        Ok(outcome)
    }

    /// Apply any editor command.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation. Deleting with no
    /// selection is a no-op, not an error.
    pub fn apply(&mut self, command: &EditorCommand) -> EditorResult<()> {
        match command {
            EditorCommand::AddLogo(upload) => self.add_logo(upload).map(drop),
            EditorCommand::AddText(input) => self.add_text(input).map(drop),
            EditorCommand::Select(id) => self.select(*id),
            EditorCommand::ClearSelection => {
                self.clear_selection();
                Ok(())
            }
            EditorCommand::DeleteSelected => {
                self.delete_selected();
                Ok(())
            }
            EditorCommand::Resize { delta } => self.resize_selected(*delta),
            EditorCommand::Rotate { delta } => self.rotate_selected(*delta),
            EditorCommand::Pointer(event) => self.dispatch(event).map(drop),
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanvasRect, ViewportPoint};

    fn png_upload() -> LogoUpload {
        LogoUpload::new("logo.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47])
    }

    #[test]
    fn test_add_logo_centers_and_selects() {
        let mut state = EditorState::new(CanvasSize::new(500.0, 600.0));
        let id = state.add_logo(&png_upload()).expect("add logo");

        assert_eq!(state.selected(), Some(id));
        let g = state.selected_element().expect("selected").geometry;
        assert_eq!((g.x, g.y, g.width, g.height), (200.0, 250.0, 100.0, 100.0));
    }

    #[test]
    fn test_rejected_upload_leaves_state_untouched() {
        let mut state = EditorState::default();
        let before = state.revision();

        let err = state
            .add_logo(&LogoUpload::new("notes.txt", "text/plain", b"hi".to_vec()))
            .unwrap_err();

        assert!(err.is_user_error());
        assert!(state.store().is_empty());
        assert_eq!(state.selected(), None);
        assert_eq!(state.revision(), before);
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut state = EditorState::default();
        assert!(state.add_text(&TextInput::new("  ")).is_err());
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut state = EditorState::default();
        state.add_text(&TextInput::new("  Team  ")).expect("add text");
        match &state.selected_element().expect("selected").kind {
            crate::ElementKind::Text { content, .. } => assert_eq!(content, "Team"),
            crate::ElementKind::Logo { .. } => panic!("expected text"),
        }
    }

    #[test]
    fn test_select_is_exclusive() {
        let mut state = EditorState::default();
        let a = state.add_text(&TextInput::new("a")).expect("add");
        let b = state.add_text(&TextInput::new("b")).expect("add");

        state.select(a).expect("select a");
        state.select(b).expect("select b");
        assert_eq!(state.selected(), Some(b));
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut state = EditorState::default();
        let a = state.add_text(&TextInput::new("a")).expect("add");
        let b = state.add_text(&TextInput::new("b")).expect("add");

        let removed = state.delete_selected().expect("something removed");
        assert_eq!(removed.id, b);
        assert_eq!(state.selected(), None);
        assert_eq!(state.store().len(), 1);
        assert!(state.store().get(a).is_some());

        assert!(state.delete_selected().is_none());
    }

    #[test]
    fn test_removing_unselected_keeps_selection() {
        let mut state = EditorState::default();
        let a = state.add_text(&TextInput::new("a")).expect("add");
        let b = state.add_text(&TextInput::new("b")).expect("add");

        state.remove(a).expect("remove");
        assert_eq!(state.selected(), Some(b));
    }

    #[test]
    fn test_resize_and_rotate_need_selection() {
        let mut state = EditorState::default();
        assert!(matches!(
            state.resize_selected(10.0),
            Err(EditorError::NoSelection)
        ));
        assert!(matches!(
            state.rotate_selected(5.0),
            Err(EditorError::NoSelection)
        ));
    }

    #[test]
    fn test_resize_selected_logo() {
        let mut state = EditorState::new(CanvasSize::new(500.0, 600.0));
        state.add_logo(&png_upload()).expect("add logo");
        state.resize_selected(10.0).expect("resize");

        let g = state.selected_element().expect("selected").geometry;
        assert_eq!((g.width, g.height), (110.0, 110.0));
    }

    #[test]
    fn test_rotate_accumulates() {
        let mut state = EditorState::default();
        state.add_text(&TextInput::new("spin")).expect("add");
        for _ in 0..3 {
            state.rotate_selected(-5.0).expect("rotate");
        }
        let g = state.selected_element().expect("selected").geometry;
        assert!((g.rotation_degrees + 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_delete_during_drag_returns_to_idle() {
        let mut state = EditorState::new(CanvasSize::new(500.0, 600.0));
        state.add_logo(&png_upload()).expect("add logo");
        let rect = CanvasRect::new(0.0, 0.0, 500.0, 600.0);
        state
            .dispatch(&PointerEvent::down(ViewportPoint::new(250.0, 300.0), rect))
            .expect("down");
        assert!(matches!(state.phase(), InteractionPhase::Dragging { .. }));

        state.delete_selected();
        assert_eq!(state.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn test_apply_commands() {
        let mut state = EditorState::new(CanvasSize::new(500.0, 600.0));
        let commands = [
            EditorCommand::AddText(TextInput::new("Hello")),
            EditorCommand::Resize { delta: 10.0 },
            EditorCommand::Rotate { delta: 5.0 },
        ];
        for command in &commands {
            state.apply(command).expect("apply");
        }

        let g = state.selected_element().expect("selected").geometry;
        assert_eq!((g.width, g.height), (210.0, 40.0));
        assert!((g.rotation_degrees - 5.0).abs() < f32::EPSILON);

        state.apply(&EditorCommand::DeleteSelected).expect("delete");
        state.apply(&EditorCommand::DeleteSelected).expect("no-op delete");
        assert!(state.store().is_empty());
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut state = EditorState::default();
        let r0 = state.revision();
        let id = state.add_text(&TextInput::new("x")).expect("add");
        let r1 = state.revision();
        assert!(r1 > r0);

        state.select(id).expect("reselect");
        assert_eq!(state.revision(), r1);
    }
}
