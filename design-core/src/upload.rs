//! Inputs that create new elements.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::element::{DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR};

/// A file chosen by the user for a logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoUpload {
    /// Original file name, for log messages only.
    #[serde(default)]
    pub file_name: String,
    /// MIME type reported for the file.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl LogoUpload {
    /// Create an upload.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Encode the file as a `data:` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.mime_type.to_ascii_lowercase())
    }
}

/// Text confirmed by the user, with its style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    /// Text content.
    pub content: String,
    /// Font size in pixels.
    #[serde(default = "TextInput::default_font_size")]
    pub font_size: f32,
    /// Text color as hex.
    #[serde(default = "TextInput::default_color")]
    pub color: String,
}

impl TextInput {
    /// Text with the default style.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }

    /// Set the font size.
    #[must_use]
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    const fn default_font_size() -> f32 {
        DEFAULT_FONT_SIZE
    }

    fn default_color() -> String {
        DEFAULT_TEXT_COLOR.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_encoding() {
        let upload = LogoUpload::new("a.png", "image/PNG", vec![0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(upload.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_text_defaults_from_json() {
        let input: TextInput = serde_json::from_str(r#"{"content":"Hello"}"#).expect("parse");
        assert_eq!(input, TextInput::new("Hello"));
    }
}
