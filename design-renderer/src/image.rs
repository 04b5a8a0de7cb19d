//! Image loading utilities.
//!
//! Decodes base64 data URIs (logos, exported designs) and prepares product
//! photos for use as the faint background layer.

use std::borrow::Cow;
use std::io::Cursor;

use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Decoded RGBA image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
    /// Original format of the image.
    pub format: ImageFormat,
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF (first frame only).
    Gif,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// Whether the rasterizer can embed this format directly.
    #[must_use]
    pub fn is_embeddable(self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Gif)
    }
}

/// A parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared media type (empty if omitted).
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a data URI such as `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns an error if the URI is malformed or its payload cannot be decoded.
pub fn parse_data_uri(uri: &str) -> RenderResult<DataUri> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let comma_pos = uri_data
        .find(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let metadata = &uri_data[..comma_pos];
    let encoded_data = &uri_data[comma_pos + 1..];

    let is_base64 = metadata.ends_with(";base64");
    let mime = metadata
        .split(';')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded_data)?
    };

    Ok(DataUri { mime, bytes })
}

/// Encode bytes as a base64 data URI.
#[must_use]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Percent-decoding for non-base64 data URIs.
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Load an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<DecodedImage> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

impl DecodedImage {
    /// Encode the pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel buffer does not match the dimensions.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let rgba = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| {
                RenderError::Encode("Pixel buffer does not match image size".to_string())
            })?;
        encode_png(&image::DynamicImage::ImageRgba8(rgba))
    }
}

/// Make a logo `data:` URI safe to hand to the rasterizer.
///
/// PNG, JPEG, GIF and SVG pass through. Other decodable bitmaps (BMP, TIFF,
/// ICO, WebP, ...) are re-encoded as PNG, since the rasterizer drops images
/// it cannot decode without reporting it.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed or the payload
/// is not a decodable image.
pub fn embeddable_data_uri(uri: &str) -> RenderResult<Cow<'_, str>> {
    let parsed = parse_data_uri(uri)?;
    let format = ImageFormat::from_magic_bytes(&parsed.bytes);
    if parsed.mime == "image/svg+xml" || format.is_embeddable() {
        return Ok(Cow::Borrowed(uri));
    }

    let decoded = load_image_from_bytes(&parsed.bytes)?;
    let png = decoded.to_png()?;
    tracing::debug!(
        "Re-encoded {} logo as {}x{} PNG",
        if parsed.mime.is_empty() { "untyped" } else { parsed.mime.as_str() },
        decoded.width,
        decoded.height
    );
    Ok(Cow::Owned(encode_data_uri("image/png", &png)))
}

fn encode_png(img: &image::DynamicImage) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Turn fetched product image bytes into a data URI the rasterizer can embed.
///
/// PNG, JPEG and GIF pass through unchanged when they already fit within
/// `max_width` x `max_height`; anything else decodable (e.g. WebP) or
/// oversized is re-encoded as a downscaled PNG.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn normalize_background(bytes: &[u8], max_width: u32, max_height: u32) -> RenderResult<String> {
    let format = ImageFormat::from_magic_bytes(bytes);
    let img = image::load_from_memory(bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode background: {e}")))?;

    let fits = img.width() <= max_width && img.height() <= max_height;
    if fits && format.is_embeddable() {
        let mime = match format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            _ => "image/png",
        };
        return Ok(encode_data_uri(mime, bytes));
    }

    let img = if fits {
        img
    } else {
        img.resize(
            max_width.max(1),
            max_height.max(1),
            image::imageops::FilterType::Lanczos3,
        )
    };

    let png = encode_png(&img)?;
    tracing::debug!(
        "Re-encoded background {:?} as {}x{} PNG",
        format,
        img.width(),
        img.height()
    );
    Ok(encode_data_uri("image/png", &png))
}
