//! Serialized representation of a design, for saving and reloading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    CanvasSize, EditorError, EditorResult, EditorState, Element, ElementId, ElementKind,
    ElementStore, Geometry,
};

/// Document-friendly element description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDocument {
    /// Element identifier.
    pub id: String,
    /// Element content.
    pub kind: ElementKind,
    /// Position, size and rotation.
    pub geometry: Geometry,
}

impl From<&Element> for ElementDocument {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.to_string(),
            kind: element.kind.clone(),
            geometry: element.geometry,
        }
    }
}

impl ElementDocument {
    /// Convert document to runtime element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element id is not a valid UUID or the
    /// geometry is below the minimum size.
    pub fn into_element(self) -> EditorResult<Element> {
        let id = ElementId::parse(&self.id).map_err(|e| {
            EditorError::InvalidOperation(format!("bad element id {}: {e}", self.id))
        })?;
        if !self.geometry.meets_min_size() {
            return Err(EditorError::InvalidOperation(format!(
                "element {id} is below the minimum size"
            )));
        }
        let mut element = Element::new(self.kind, self.geometry);
        element.id = id;
        Ok(element)
    }
}

/// Canonical design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    /// Product the design was made for, if known.
    #[serde(default)]
    pub product_id: Option<u64>,
    /// Canvas dimensions.
    pub canvas: CanvasSize,
    /// Elements in paint order.
    pub elements: Vec<ElementDocument>,
    /// Save time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub saved_at_ms: u64,
}

impl DesignDocument {
    /// Build a document from editor state.
    pub fn from_state(product_id: Option<u64>, state: &EditorState, saved_at_ms: u64) -> Self {
        Self {
            product_id,
            canvas: state.canvas(),
            elements: state.elements().map(ElementDocument::from).collect(),
            saved_at_ms,
        }
    }

    /// Materialize editor state from this document.
    ///
    /// # Errors
    ///
    /// Returns an error if any element cannot be materialized.
    pub fn into_state(self) -> EditorResult<EditorState> {
        let mut store = ElementStore::new();
        for element_doc in self.elements {
            store.add(element_doc.into_element()?);
        }
        Ok(EditorState::with_store(self.canvas, store))
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string_pretty(self).map_err(EditorError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        serde_json::from_str(json).map_err(EditorError::Serialization)
    }

    /// Read a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Write the document to disk.
    ///
    /// The file is written next to its destination first and renamed into
    /// place, so a failed save never leaves a truncated document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(
            "Saved design with {} elements to {}",
            self.elements.len(),
            path.display()
        );
        Ok(())
    }
}
