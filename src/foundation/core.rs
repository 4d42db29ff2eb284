use crate::foundation::error::{FramerError, FramerResult};

/// Integer pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> FramerResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramerError::Other(anyhow::anyhow!(
                "pixel size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Whether `self` fits inside `outer` on both axes.
    pub fn fits_within(self, outer: PixelSize) -> bool {
        self.width <= outer.width && self.height <= outer.height
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}
