use std::path::{Path, PathBuf};

use crate::foundation::{
    core::PixelSize,
    error::{FramerError, FramerResult},
};

const IPHONE_SVG: &str = include_str!("../../frames/iphone.svg");
const IPAD_SVG: &str = include_str!("../../frames/ipad.svg");

/// Where a frame's vector template comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateRef {
    /// Template compiled into the binary.
    Embedded {
        /// Logical file name, used in diagnostics.
        name: &'static str,
        /// Raw SVG text.
        svg: &'static str,
    },
    /// Template read from disk for every job.
    File(PathBuf),
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded { name, .. } => write!(f, "builtin:{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A named device mockup preset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    /// Unique lookup key.
    pub name: String,
    /// Vector template containing the screenshot insertion point.
    pub template: TemplateRef,
    /// Pixels the screenshot must fill.
    pub screen: PixelSize,
    /// Pixels of the final output.
    pub canvas: PixelSize,
}

/// Immutable table of frame presets, built once and shared by reference.
#[derive(Clone, Debug)]
pub struct FrameRegistry {
    frames: Vec<FrameConfig>,
}

impl FrameRegistry {
    /// Build a registry from explicit presets.
    ///
    /// Names must be unique and every screen region must fit inside its canvas.
    pub fn new(frames: Vec<FrameConfig>) -> FramerResult<Self> {
        for (i, frame) in frames.iter().enumerate() {
            if frames[..i].iter().any(|f| f.name == frame.name) {
                return Err(FramerError::Other(anyhow::anyhow!(
                    "duplicate frame preset '{}'",
                    frame.name
                )));
            }
            if !frame.screen.fits_within(frame.canvas) {
                return Err(FramerError::Other(anyhow::anyhow!(
                    "frame '{}' screen {} does not fit canvas {}",
                    frame.name,
                    frame.screen,
                    frame.canvas
                )));
            }
        }
        Ok(Self { frames })
    }

    /// The presets shipped with the tool: `iphone` and `ipad`.
    pub fn builtin() -> Self {
        Self {
            frames: vec![
                FrameConfig {
                    name: "iphone".to_string(),
                    template: TemplateRef::Embedded {
                        name: "iphone.svg",
                        svg: IPHONE_SVG,
                    },
                    screen: PixelSize {
                        width: 710,
                        height: 1536,
                    },
                    canvas: PixelSize {
                        width: 750,
                        height: 1576,
                    },
                },
                FrameConfig {
                    name: "ipad".to_string(),
                    template: TemplateRef::Embedded {
                        name: "ipad.svg",
                        svg: IPAD_SVG,
                    },
                    screen: PixelSize {
                        width: 1024,
                        height: 1366,
                    },
                    canvas: PixelSize {
                        width: 1060,
                        height: 1400,
                    },
                },
            ],
        }
    }

    /// Point every preset at `<dir>/<name>.svg` instead of its current template.
    pub fn with_template_dir(mut self, dir: &Path) -> Self {
        for frame in &mut self.frames {
            frame.template = TemplateRef::File(dir.join(format!("{}.svg", frame.name)));
        }
        self
    }

    pub fn lookup(&self, name: &str) -> FramerResult<&FrameConfig> {
        self.frames
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FramerError::unknown_frame_type(name, self.names()))
    }

    /// Registered names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameConfig> {
        self.frames.iter()
    }
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/registry.rs"]
mod tests;
