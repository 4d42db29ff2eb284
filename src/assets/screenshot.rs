use std::{io::Cursor, path::Path};

use base64::Engine as _;
use image::imageops::FilterType;

use crate::foundation::{
    core::PixelSize,
    error::{FramerError, FramerResult},
};

/// MIME type of every prepared screenshot payload.
pub const PNG_MIME: &str = "image/png";

/// Losslessly encoded screenshot, already sized to a frame's screen region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddableImage {
    /// Pixel dimensions of the encoded image.
    pub size: PixelSize,
    /// Declared MIME type of `bytes`.
    pub mime: &'static str,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl EmbeddableImage {
    /// `data:` URI suitable for an SVG `href`.
    pub fn to_data_uri(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.mime)
    }
}

/// Geometry of a cover fit, expressed in source pixels: the centered window of the source that,
/// scaled uniformly, exactly covers the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverFit {
    /// Left edge of the crop window.
    pub crop_x: u32,
    /// Top edge of the crop window.
    pub crop_y: u32,
    /// Size of the crop window; never larger than the source.
    pub crop: PixelSize,
}

impl CoverFit {
    pub fn compute(source: PixelSize, target: PixelSize) -> Self {
        let sx = f64::from(target.width) / f64::from(source.width);
        let sy = f64::from(target.height) / f64::from(source.height);
        let scale = sx.max(sy);

        let width = window(target.width, scale, source.width);
        let height = window(target.height, scale, source.height);

        Self {
            crop_x: (source.width - width) / 2,
            crop_y: (source.height - height) / 2,
            crop: PixelSize { width, height },
        }
    }
}

fn window(target: u32, scale: f64, source: u32) -> u32 {
    let len = (f64::from(target) / scale).round();
    if len >= f64::from(source) {
        source
    } else {
        (len as u32).max(1)
    }
}

/// Read a screenshot from disk and cover-fit it to `target`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn prepare_screenshot(path: &Path, target: PixelSize) -> FramerResult<EmbeddableImage> {
    let bytes = std::fs::read(path).map_err(|e| FramerError::io(path, e))?;
    prepare_screenshot_bytes(&bytes, target)
}

/// Decode encoded image bytes, cover-fit them to `target`, and re-encode as PNG.
pub fn prepare_screenshot_bytes(bytes: &[u8], target: PixelSize) -> FramerResult<EmbeddableImage> {
    let source = image::load_from_memory(bytes).map_err(|e| FramerError::decode(e.to_string()))?;
    let source_size = PixelSize::new(source.width(), source.height())
        .map_err(|_| FramerError::decode("source image has no pixels"))?;
    tracing::info!("original size: {source_size}");

    let fit = CoverFit::compute(source_size, target);
    let cropped = source.crop_imm(fit.crop_x, fit.crop_y, fit.crop.width, fit.crop.height);
    drop(source);
    let resized = cropped.resize_exact(target.width, target.height, FilterType::Lanczos3);
    let rgba = image::DynamicImage::ImageRgba8(resized.to_rgba8());

    let mut encoded = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
        .map_err(|e| FramerError::decode(format!("encode png: {e}")))?;

    Ok(EmbeddableImage {
        size: PixelSize {
            width: rgba.width(),
            height: rgba.height(),
        },
        mime: PNG_MIME,
        bytes: encoded,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/screenshot.rs"]
mod tests;
