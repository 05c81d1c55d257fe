use crate::foundation::error::{LaserframeError, LaserframeResult};

pub use kurbo::{Point, Rect};

/// Absolute 0-based frame index in source-video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Non-empty pixel rectangle in source-frame coordinates.
///
/// `x0 < x1` and `y0 < y1` always hold; construction returns `None` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelRect {
    /// Build from corners (`x1`/`y1` exclusive). `None` when the area is zero.
    pub fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Option<Self> {
        if x1 > x0 && y1 > y0 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Build from an origin and a size. `None` when the area is zero.
    pub fn from_origin_size(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        Self::from_corners(x, y, x.checked_add(width)?, y.checked_add(height)?)
    }

    /// Full frame of the given dimensions.
    pub fn full(width: u32, height: u32) -> Option<Self> {
        Self::from_corners(0, 0, width, height)
    }

    pub fn x0(self) -> u32 {
        self.x0
    }

    pub fn y0(self) -> u32 {
        self.y0
    }

    pub fn x1(self) -> u32 {
        self.x1
    }

    pub fn y1(self) -> u32 {
        self.y1
    }

    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    /// Return `true` when the rect lies inside a `width x height` frame.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        self.x1 <= width && self.y1 <= height
    }

    /// Largest square centered inside this rect (offset rounds toward the top-left).
    pub fn centered_square(self) -> Self {
        let side = self.width().min(self.height());
        let dx = (self.width() - side) / 2;
        let dy = (self.height() - side) / 2;
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x0 + dx + side,
            y1: self.y0 + dy + side,
        }
    }
}

/// Fixed pixel size of the composited output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    /// Create a validated size with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> LaserframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(LaserframeError::validation(
                "output width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn square(side: u32) -> LaserframeResult<Self> {
        Self::new(side, side)
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
