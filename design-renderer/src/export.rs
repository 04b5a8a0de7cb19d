//! Design export to PNG.
//!
//! Composes a [`Composition`] into an SVG intermediate and rasterizes it with
//! resvg/tiny-skia at the configured scale. The result is offered both as a
//! downloadable file and as a `data:` URL for embedding in an order.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use design_core::{CanvasSize, EditorState, Element, ElementKind};

use crate::error::{RenderError, RenderResult};
use crate::image::{embeddable_data_uri, encode_data_uri};

/// Configuration for design export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output pixels per canvas pixel (default: 2.0).
    pub scale: f32,
    /// Canvas background color as RGBA bytes (default: `#f3f4f6`).
    pub background: [u8; 4],
    /// Opacity of the product photo behind the elements (default: 0.3).
    pub background_image_opacity: f32,
    /// Font family used for text elements.
    pub font_family: String,
    /// Load the host's installed fonts for text rendering.
    pub load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: [0xf3, 0xf4, 0xf6, 0xff],
            background_image_opacity: 0.3,
            font_family: "sans-serif".to_string(),
            load_system_fonts: true,
        }
    }
}

/// Everything visible on the canvas at the moment of export.
///
/// Owns its data so rasterization can run off-thread while the editor
/// keeps accepting edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Canvas dimensions in canvas pixels.
    pub canvas: CanvasSize,
    /// Elements in paint order.
    pub elements: Vec<Element>,
    /// Product photo as a `data:` URL, drawn behind the elements.
    pub background: Option<String>,
}

impl Composition {
    /// Create a composition without a background photo.
    #[must_use]
    pub fn new(canvas: CanvasSize, elements: Vec<Element>) -> Self {
        Self {
            canvas,
            elements,
            background: None,
        }
    }

    /// Snapshot the editor's current elements.
    #[must_use]
    pub fn from_state(state: &EditorState) -> Self {
        Self::new(state.canvas(), state.elements().cloned().collect())
    }

    /// Attach a background photo.
    #[must_use]
    pub fn with_background(mut self, data_url: Option<String>) -> Self {
        self.background = data_url;
        self
    }
}

/// A rasterized design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDesign {
    /// PNG-encoded bytes.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RenderedDesign {
    /// The PNG as a `data:image/png;base64,...` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        encode_data_uri("image/png", &self.png)
    }
}

/// Result of exporting to disk.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// Where the PNG was written.
    pub path: PathBuf,
    /// The same PNG as a `data:` URL.
    pub data_url: String,
}

/// Renders compositions to PNG.
///
/// Cloning is cheap; the font database is shared.
#[derive(Clone)]
pub struct DesignExporter {
    config: ExportConfig,
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for DesignExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignExporter")
            .field("config", &self.config)
            .field("fonts", &self.fontdb.len())
            .finish()
    }
}

impl DesignExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
            report_font_faces(&db);
        }
        Self {
            config,
            fontdb: Arc::new(db),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Output size in pixels for a canvas.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_dimensions(&self, canvas: CanvasSize) -> (u32, u32) {
        let w = (canvas.width * self.config.scale).round().max(1.0) as u32;
        let h = (canvas.height * self.config.scale).round().max(1.0) as u32;
        (w, h)
    }

    /// Compose the design as an SVG document.
    ///
    /// Logos in formats the rasterizer cannot decode are converted to PNG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Resource`] if a logo is not a decodable image.
    pub fn render_to_svg(&self, composition: &Composition) -> RenderResult<String> {
        let (out_w, out_h) = self.output_dimensions(composition.canvas);
        let CanvasSize { width, height } = composition.canvas;

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {width} {height}\">",
        );

        let bg = &self.config.background;
        let _ = write!(
            svg,
            "<rect width=\"{width}\" height=\"{height}\" fill=\"rgb({},{},{})\" fill-opacity=\"{}\"/>",
            bg[0],
            bg[1],
            bg[2],
            f32::from(bg[3]) / 255.0,
        );

        if let Some(src) = &composition.background {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" opacity=\"{}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"{}\"/>",
                self.config.background_image_opacity.clamp(0.0, 1.0),
                escape_xml(src),
            );
        }

        for element in &composition.elements {
            self.render_element_svg(&mut svg, element)?;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Rasterize the design.
    ///
    /// # Errors
    ///
    /// Returns an error if a logo cannot be decoded, or the SVG cannot be
    /// rasterized or encoded.
    pub fn render(&self, composition: &Composition) -> RenderResult<RenderedDesign> {
        let svg = self.render_to_svg(composition)?;
        let pixmap = self.rasterize_svg(&svg)?;
        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;

        tracing::debug!(
            "Rendered {} elements to {}x{} PNG ({} bytes)",
            composition.elements.len(),
            pixmap.width(),
            pixmap.height(),
            png.len()
        );

        Ok(RenderedDesign {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }

    /// Export the design to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, composition: &Composition) -> RenderResult<Vec<u8>> {
        self.render(composition).map(|rendered| rendered.png)
    }

    /// Export the design as a PNG `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_data_url(&self, composition: &Composition) -> RenderResult<String> {
        self.render(composition).map(|rendered| rendered.data_url())
    }

    /// Rasterize on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the task is cancelled.
    pub async fn render_png_async(&self, composition: Composition) -> RenderResult<RenderedDesign> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.render(&composition))
            .await
            .map_err(|e| RenderError::Join(e.to_string()))?
    }

    /// Render and write a downloadable PNG into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub fn export_to_file(
        &self,
        composition: &Composition,
        dir: impl AsRef<Path>,
        product_id: Option<u64>,
    ) -> RenderResult<ExportedFile> {
        let rendered = self.render(composition)?;
        let path = save_download(&rendered, dir, product_id)?;
        Ok(ExportedFile {
            path,
            data_url: rendered.data_url(),
        })
    }

    fn render_element_svg(&self, svg: &mut String, element: &Element) -> RenderResult<()> {
        let g = &element.geometry;
        let center = g.center();
        let _ = write!(
            svg,
            "<g transform=\"rotate({} {} {})\">",
            g.rotation_degrees, center.x, center.y,
        );

        match &element.kind {
            ElementKind::Logo { src } => {
                let src = embeddable_data_uri(src).inspect_err(|e| {
                    tracing::warn!("Logo {} cannot be rendered: {e}", element.id);
                })?;
                let _ = write!(
                    svg,
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"{}\"/>",
                    g.x,
                    g.y,
                    g.width,
                    g.height,
                    escape_xml(&src),
                );
            }
            ElementKind::Text {
                content,
                font_size,
                color,
            } => {
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"{font_size}\" font-weight=\"bold\" font-family=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                    center.x,
                    center.y,
                    escape_xml(&self.config.font_family),
                    escape_xml(color),
                    escape_xml(content),
                );
            }
        }

        svg.push_str("</g>");
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg: &str) -> RenderResult<tiny_skia::Pixmap> {
        let opt = usvg::Options {
            font_family: self.config.font_family.clone(),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| RenderError::Rasterize(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Rasterize("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

fn report_font_faces(db: &fontdb::Database) {
    if db.is_empty() {
        tracing::warn!("No system fonts found; text elements will not be rendered");
    } else {
        tracing::debug!("Loaded {} font faces", db.len());
    }
}

impl Default for DesignExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// File name for a download, e.g. `design-42-1700000000000.png`.
#[must_use]
pub fn download_file_name(product_id: Option<u64>, timestamp_ms: u128) -> String {
    let product = product_id.map_or_else(|| "product".to_string(), |id| id.to_string());
    format!("design-{product}-{timestamp_ms}.png")
}

/// Upper bound on `-N` suffixes tried for one timestamp.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// `design-1-7.png` with sequence 2 becomes `design-1-7-2.png`.
fn sequenced_file_name(name: &str, sequence: u32) -> String {
    if sequence <= 1 {
        return name.to_string();
    }
    let stem = name.strip_suffix(".png").unwrap_or(name);
    format!("{stem}-{sequence}.png")
}

/// Claim a fresh file name in `dir`, suffixing `-2`, `-3`, ... when taken.
fn reserve_download_path(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    for sequence in 1..=MAX_NAME_ATTEMPTS {
        let path = dir.join(sequenced_file_name(name, sequence));
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for {name}"),
    ))
}

/// Write a rendered design into `dir` under a timestamped name.
///
/// Never replaces an existing file: a name already taken (two exports in
/// the same millisecond) gets a `-2`, `-3`, ... suffix. The PNG lands under
/// a hidden temporary name first and is renamed into place; on failure
/// nothing is left behind.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_download(
    rendered: &RenderedDesign,
    dir: impl AsRef<Path>,
    product_id: Option<u64>,
) -> RenderResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let name = download_file_name(product_id, timestamp_ms);
    let path = reserve_download_path(dir, &name)?;
    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or(&name)
    ));

    if let Err(e) = std::fs::write(&tmp, &rendered.png).and_then(|()| std::fs::rename(&tmp, &path))
    {
        let _ = std::fs::remove_file(&tmp);
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }

    tracing::info!("Exported design to {}", path.display());
    Ok(path)
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
