//! framemaker composites app screenshots into device-frame mockups.
//!
//! # Pipeline overview
//!
//! 1. **Lookup**: frame name -> [`FrameConfig`] in an immutable [`FrameRegistry`]
//! 2. **Prepare**: screenshot -> [`EmbeddableImage`] cover-fitted to the frame's screen region
//! 3. **Compose**: SVG template + image -> [`ComposedDocument`] (validated insertion point)
//! 4. **Rasterize**: document -> [`RenderedRaster`] at the frame's canvas width
//! 5. **Write**: PNG bytes -> `<output-dir>/<stem>-framed.png`, atomically
//!
//! [`BatchRunner`] applies this to every file matched by a glob pattern; a bad screenshot is
//! recorded in the [`BatchReport`] and does not stop the others.
#![forbid(unsafe_code)]

mod assets;
mod compose;
mod foundation;
mod frames;
mod pipeline;
mod render;

pub use assets::screenshot::{
    CoverFit, EmbeddableImage, PNG_MIME, prepare_screenshot, prepare_screenshot_bytes,
};
pub use compose::template::{
    ComposedDocument, SCREENSHOT_PLACEHOLDER, compose, load_template, locate_insertion_point,
    preflight_template,
};
pub use foundation::core::PixelSize;
pub use foundation::error::{FramerError, FramerResult};
pub use frames::registry::{FrameConfig, FrameRegistry, TemplateRef};
pub use pipeline::batch::{
    BatchOptions, BatchReport, BatchRunner, BatchSummary, FailureSummary, GlobResolver,
    InputResolver, JobFailure, output_path_for, resolve_inputs,
};
pub use pipeline::job::{FramingPipeline, ScreenshotJob};
pub use render::raster::{RenderedRaster, Rasterizer, fit_to_width};
