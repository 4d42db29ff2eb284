use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    assets::screenshot::prepare_screenshot,
    compose::template::compose,
    foundation::{
        core::PixelSize,
        error::{FramerError, FramerResult},
    },
    frames::registry::{FrameConfig, FrameRegistry},
    render::raster::Rasterizer,
};

/// One screenshot to frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenshotJob {
    /// Source screenshot.
    pub input: PathBuf,
    /// Destination PNG.
    pub output: PathBuf,
    /// Frame preset name.
    pub frame: String,
}

/// Prepare → compose → rasterize → write, for a single job.
///
/// Holds only shared read-only state; every buffer it creates is local to one [`run`](Self::run).
#[derive(Clone, Copy)]
pub struct FramingPipeline<'a> {
    registry: &'a FrameRegistry,
    rasterizer: &'a Rasterizer,
}

impl<'a> FramingPipeline<'a> {
    pub fn new(registry: &'a FrameRegistry, rasterizer: &'a Rasterizer) -> Self {
        Self {
            registry,
            rasterizer,
        }
    }

    pub fn registry(&self) -> &'a FrameRegistry {
        self.registry
    }

    /// Frame `job.input` and write the PNG to `job.output`.
    ///
    /// The frame name is resolved before any file is touched. Every failure comes back wrapped in
    /// [`FramerError::Job`], and nothing is left at `job.output` unless the run succeeds.
    /// Returns the pixel size of the written image.
    #[tracing::instrument(skip_all, fields(input = %job.input.display(), frame = %job.frame))]
    pub fn run(&self, job: &ScreenshotJob) -> FramerResult<PixelSize> {
        let frame = self
            .registry
            .lookup(&job.frame)
            .map_err(|e| e.in_job(&job.input))?;
        self.run_with_frame(job, frame)
            .map_err(|e| e.in_job(&job.input))
    }

    fn run_with_frame(&self, job: &ScreenshotJob, frame: &FrameConfig) -> FramerResult<PixelSize> {
        tracing::info!("processing: {}", display_name(&job.input));

        let screenshot = prepare_screenshot(&job.input, frame.screen)?;
        let document = compose(&frame.template, &screenshot)?;
        drop(screenshot);

        let raster = self.rasterizer.render(&document, frame.canvas.width)?;
        if raster.size != frame.canvas {
            tracing::warn!(
                "template {} rendered at {}, frame '{}' expects {}",
                frame.template,
                raster.size,
                frame.name,
                frame.canvas
            );
        }

        write_atomic(&job.output, &raster.png)?;
        tracing::info!("saved: {}", job.output.display());
        tracing::info!("output size: {}", raster.size);
        Ok(raster.size)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

/// Write through a hidden sibling file and rename it into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> FramerResult<()> {
    let name = path
        .file_name()
        .ok_or_else(|| FramerError::io(path, std::io::Error::other("output path has no file name")))?;
    let tmp = path.with_file_name(format!(
        ".{}.{}-{}.tmp",
        name.to_string_lossy(),
        std::process::id(),
        NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed)
    ));

    let mut guard = TempFileGuard(Some(tmp.clone()));
    std::fs::write(&tmp, bytes).map_err(|e| FramerError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| FramerError::io(path, e))?;
    guard.0 = None;
    Ok(())
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
