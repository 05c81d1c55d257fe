//! Geometry Resolver: turns framing parameters into a source-pixel rectangle.
//!
//! The resolver never looks at pixel data. It needs the source frame dimensions and, for crop
//! framing, the display layout the crop corners were drawn against.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{PixelRect, Point, Rect};
use crate::params::Framing;

/// Canvas size used when the caller reports a collapsed display surface.
pub const DEFAULT_CANVAS_WIDTH: u32 = 640;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 480;

/// Where a frame is drawn inside the interactive preview canvas.
///
/// The frame is scaled uniformly to fit the canvas and centered; `offset_*` is the top-left
/// corner of the drawn image in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl DisplayLayout {
    /// Fit a `frame_width x frame_height` frame inside a canvas.
    ///
    /// Canvas dimensions of 0 or 1 (an unrealized widget) fall back to 640x480.
    pub fn fit(frame_width: u32, frame_height: u32, canvas_width: u32, canvas_height: u32) -> Self {
        let canvas_width = if canvas_width <= 1 {
            DEFAULT_CANVAS_WIDTH
        } else {
            canvas_width
        };
        let canvas_height = if canvas_height <= 1 {
            DEFAULT_CANVAS_HEIGHT
        } else {
            canvas_height
        };

        // Integer arithmetic keeps the limiting axis exactly equal to the canvas. The other axis
        // keeps at least one pixel so extreme aspect ratios still map crops.
        let (fw, fh) = (u64::from(frame_width), u64::from(frame_height));
        let (cw, ch) = (u64::from(canvas_width), u64::from(canvas_height));
        let (image_width, image_height) = if fw == 0 || fh == 0 {
            (0, 0)
        } else if cw * fh <= ch * fw {
            (canvas_width, ((fh * cw / fw) as u32).max(1))
        } else {
            (((fw * ch / fh) as u32).max(1), canvas_height)
        };

        Self {
            canvas_width,
            canvas_height,
            image_width,
            image_height,
            offset_x: (canvas_width - image_width) / 2,
            offset_y: (canvas_height - image_height) / 2,
        }
    }

    /// Canvas point to normalized image coordinates (0..1 inside the drawn image).
    fn to_normalized(self, p: Point) -> Option<Point> {
        if self.image_width == 0 || self.image_height == 0 {
            return None;
        }
        Some(Point::new(
            (p.x - f64::from(self.offset_x)) / f64::from(self.image_width),
            (p.y - f64::from(self.offset_y)) / f64::from(self.image_height),
        ))
    }

    fn from_normalized(self, n: Point) -> Point {
        Point::new(
            f64::from(self.offset_x) + n.x * f64::from(self.image_width),
            f64::from(self.offset_y) + n.y * f64::from(self.image_height),
        )
    }
}

/// A crop drawn on the preview canvas: two corners in canvas pixels plus the layout they were
/// drawn against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub start: Point,
    pub end: Point,
    pub layout: DisplayLayout,
}

impl CropSelection {
    pub fn new(start: Point, end: Point, layout: DisplayLayout) -> Self {
        Self { start, end, layout }
    }

    /// Re-derive the corners for a new display layout (e.g. after a window resize) so the crop
    /// keeps covering the same part of the frame.
    pub fn relayout(&self, layout: DisplayLayout) -> Self {
        let map = |p: Point| match self.layout.to_normalized(p) {
            Some(n) => layout.from_normalized(n),
            None => p,
        };
        Self {
            start: map(self.start),
            end: map(self.end),
            layout,
        }
    }

    /// Map the corners into source-frame pixels, order-normalized and clamped.
    ///
    /// `None` when the mapped rectangle has zero area (identical corners, or fully outside the
    /// frame).
    pub fn to_source(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        if self.layout.image_width == 0 || self.layout.image_height == 0 {
            return None;
        }
        let sx = f64::from(frame_width) / f64::from(self.layout.image_width);
        let sy = f64::from(frame_height) / f64::from(self.layout.image_height);
        let map = |p: Point| {
            Point::new(
                ((p.x - f64::from(self.layout.offset_x)) * sx).trunc(),
                ((p.y - f64::from(self.layout.offset_y)) * sy).trunc(),
            )
        };

        let r = Rect::from_points(map(self.start), map(self.end));
        let clamp = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        PixelRect::from_corners(
            clamp(r.x0, frame_width),
            clamp(r.y0, frame_height),
            clamp(r.x1, frame_width),
            clamp(r.y1, frame_height),
        )
    }
}

/// Resolve the source rectangle for one pass.
///
/// Returns `None` for degenerate geometry; callers skip the frame instead of failing.
pub fn resolve_region(
    framing: &Framing,
    square_aspect: bool,
    frame_width: u32,
    frame_height: u32,
) -> Option<PixelRect> {
    let region = match framing {
        Framing::ZoomPan { zoom, pan_x, pan_y } => {
            let (x0, w) = zoom_window(frame_width, *zoom, *pan_x);
            let (y0, h) = zoom_window(frame_height, *zoom, *pan_y);
            PixelRect::from_origin_size(x0, y0, w, h)?
        }
        Framing::Crop(sel) => sel.to_source(frame_width, frame_height)?,
    };
    debug_assert!(region.fits_within(frame_width, frame_height));

    Some(if square_aspect {
        region.centered_square()
    } else {
        region
    })
}

/// One axis of the zoom/pan window: returns `(origin, size)`.
fn zoom_window(extent: u32, zoom: f64, pan: f64) -> (u32, u32) {
    if extent == 0 {
        return (0, 0);
    }
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let pan = if pan.is_finite() {
        pan.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let size = ((f64::from(extent) / zoom) as u32).clamp(1, extent);
    let max_offset = f64::from(extent - size) / 2.0;
    let offset = (pan * max_offset) as i64;
    let origin = i64::from(extent / 2) - i64::from(size / 2) + offset;
    let origin = origin.clamp(0, i64::from(extent - size)) as u32;
    (origin, size)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolve.rs"]
mod tests;
