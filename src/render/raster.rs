use std::{io::Cursor, sync::Arc};

use crate::{
    compose::template::ComposedDocument,
    foundation::{
        core::PixelSize,
        error::{FramerError, FramerResult},
    },
};

// Avoid pathological allocations from a hostile or broken template.
const MAX_DIM: u32 = 16_384;

/// Final PNG-encoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRaster {
    /// Pixel dimensions of the encoded image.
    pub size: PixelSize,
    /// PNG container bytes.
    pub png: Vec<u8>,
}

/// SVG-to-PNG renderer. Holds the font database shared by every job.
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Rasterizer {
    /// Rasterizer with an empty font database; text in templates is not drawn.
    pub fn new() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Rasterizer that resolves template text against the system fonts.
    pub fn with_system_fonts() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!(faces = fontdb.len(), "loaded system fonts");
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Render `document` so that its width is exactly `target_width` pixels.
    ///
    /// Height follows from the document's intrinsic aspect ratio.
    #[tracing::instrument(skip(self, document))]
    pub fn render(
        &self,
        document: &ComposedDocument,
        target_width: u32,
    ) -> FramerResult<RenderedRaster> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(document.as_bytes(), &options)
            .map_err(|e| FramerError::parse(e.to_string()))?;

        let (size, scale) = fit_to_width(tree.size(), target_width)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width, size.height)
            .ok_or_else(|| FramerError::render("failed to allocate pixmap"))?;
        let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let mut rgba = pixmap.take();
        demultiply_rgba8_in_place(&mut rgba);
        let img = image::RgbaImage::from_raw(size.width, size.height, rgba)
            .ok_or_else(|| FramerError::render("pixmap buffer size mismatch"))?;

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| FramerError::render(format!("encode png: {e}")))?;

        Ok(RenderedRaster { size, png })
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Output size and uniform scale for rendering `intrinsic` at `target_width`.
pub fn fit_to_width(intrinsic: usvg::Size, target_width: u32) -> FramerResult<(PixelSize, f32)> {
    if target_width == 0 {
        return Err(FramerError::render("target width must be > 0"));
    }
    let (w, h) = (f64::from(intrinsic.width()), f64::from(intrinsic.height()));
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(FramerError::render("svg has invalid width/height"));
    }

    let scale = f64::from(target_width) / w;
    // Tolerate float noise so that exact ratios do not round up an extra row.
    let height = ((h * scale - 1e-6).ceil() as u32).max(1);
    if target_width > MAX_DIM || height > MAX_DIM {
        return Err(FramerError::render(format!(
            "raster size too large: {target_width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    Ok((
        PixelSize {
            width: target_width,
            height,
        },
        scale as f32,
    ))
}

fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
