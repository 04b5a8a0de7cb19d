//! Ordered element storage.
//!
//! Insertion order doubles as paint order: the last element paints on top.
//! The store knows nothing about selection or interaction.

use serde::{Deserialize, Serialize};

use crate::{CanvasPoint, EditorError, EditorResult, Element, ElementId, GeometryPatch};

/// The ordered collection of placed elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStore {
    elements: Vec<Element>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element to the top of the paint order.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Remove an element, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove(&mut self, id: ElementId) -> EditorResult<Element> {
        let index = self
            .position(id)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;
        Ok(self.elements.remove(index))
    }

    /// Replace the geometry fields given in `patch`.
    ///
    /// Callers clamp beforehand; a patch that would shrink the element
    /// below the minimum size is rejected and the store is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found or the result would
    /// violate the minimum size.
    pub fn update(&mut self, id: ElementId, patch: GeometryPatch) -> EditorResult<()> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EditorError::ElementNotFound(id.to_string()))?;

        let next = patch.apply_to(element.geometry);
        if !next.meets_min_size() {
            return Err(EditorError::InvalidOperation(format!(
                "{id}: {}x{} is below the minimum element size",
                next.width, next.height
            )));
        }
        element.geometry = next;
        Ok(())
    }

    /// Elements in paint order, bottom first.
    ///
    /// The iterator is cheap to clone, so it can be restarted.
    pub fn list(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Index of an element in paint order.
    #[must_use]
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Find the topmost element whose hit region contains `point`.
    #[must_use]
    pub fn element_at(&self, point: CanvasPoint) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.contains_point(point))
            .map(|e| e.id)
    }

    /// Get the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<'a> IntoIterator for &'a ElementStore {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.list()
    }
}
