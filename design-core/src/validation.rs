//! Validation of user-supplied element input.
//!
//! Rejected input never reaches the store; the error message is shown to
//! the user verbatim.

use crate::{EditorError, EditorResult, LogoUpload, TextInput};

/// Largest accepted logo file.
pub const MAX_LOGO_BYTES: usize = 10 * 1024 * 1024;
/// Longest accepted text element, in characters.
pub const MAX_TEXT_CHARS: usize = 500;
/// Smallest accepted font size in pixels.
pub const MIN_FONT_SIZE: f32 = 8.0;
/// Largest accepted font size in pixels.
pub const MAX_FONT_SIZE: f32 = 200.0;

/// Validate a logo upload.
///
/// # Errors
///
/// Returns [`EditorError::InvalidInput`] if the MIME type is not `image/*`,
/// the file is empty, or it exceeds [`MAX_LOGO_BYTES`].
pub fn validate_logo_upload(upload: &LogoUpload) -> EditorResult<()> {
    if !is_image_mime(&upload.mime_type) {
        return Err(EditorError::InvalidInput(
            "Please choose an image file".to_string(),
        ));
    }
    if upload.bytes.is_empty() {
        return Err(EditorError::InvalidInput("The image file is empty".to_string()));
    }
    if upload.bytes.len() > MAX_LOGO_BYTES {
        return Err(EditorError::InvalidInput(format!(
            "Image is too large (max {} MB)",
            MAX_LOGO_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Validate text input before it becomes an element.
///
/// # Errors
///
/// Returns [`EditorError::InvalidInput`] for blank or overly long text, an
/// out-of-range font size, or a color that is not `#rgb` / `#rrggbb`.
pub fn validate_text_input(input: &TextInput) -> EditorResult<()> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(EditorError::InvalidInput("Please enter some text".to_string()));
    }
    if content.chars().count() > MAX_TEXT_CHARS {
        return Err(EditorError::InvalidInput(format!(
            "Text is too long (max {MAX_TEXT_CHARS} characters)"
        )));
    }
    if !input.font_size.is_finite()
        || input.font_size < MIN_FONT_SIZE
        || input.font_size > MAX_FONT_SIZE
    {
        return Err(EditorError::InvalidInput(format!(
            "Font size must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE} px"
        )));
    }
    if !is_hex_color(&input.color) {
        return Err(EditorError::InvalidInput(format!(
            "Invalid color: {}",
            input.color
        )));
    }
    Ok(())
}

/// Whether a MIME type names an image (`image/...`).
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Whether `color` is `#rgb` or `#rrggbb`.
#[must_use]
pub fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
