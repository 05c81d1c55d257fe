use crate::foundation::{
    core::FrameIndex,
    error::{LaserframeError, LaserframeResult},
    timecode::parse_timecode,
};

/// In/out frame selection over a video, both ends inclusive.
///
/// `in_frame < out_frame <= total - 1` always holds; edits clamp instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TimelineRange {
    in_frame: u64,
    out_frame: u64,
    total: u64,
}

impl TimelineRange {
    /// Whole-video range `[0, total - 1]`.
    pub fn for_video(total_frames: u64) -> LaserframeResult<Self> {
        if total_frames < 2 {
            return Err(LaserframeError::validation(format!(
                "a video needs at least 2 frames to select a range (got {total_frames})"
            )));
        }
        Ok(Self {
            in_frame: 0,
            out_frame: total_frames - 1,
            total: total_frames,
        })
    }

    /// Explicit range. Rejects rather than clamps, for callers passing both ends at once.
    pub fn new(in_frame: FrameIndex, out_frame: FrameIndex, total_frames: u64) -> LaserframeResult<Self> {
        let full = Self::for_video(total_frames)?;
        if in_frame.0 >= out_frame.0 || out_frame.0 >= total_frames {
            return Err(LaserframeError::validation(format!(
                "invalid frame range [{}, {}] for a video of {total_frames} frames",
                in_frame.0, out_frame.0
            )));
        }
        Ok(Self {
            in_frame: in_frame.0,
            out_frame: out_frame.0,
            ..full
        })
    }

    /// [`new`](Self::new) with missing ends defaulting to the first and last frame.
    pub fn with_bounds(
        in_frame: Option<FrameIndex>,
        out_frame: Option<FrameIndex>,
        total_frames: u64,
    ) -> LaserframeResult<Self> {
        let full = Self::for_video(total_frames)?;
        Self::new(
            in_frame.unwrap_or(full.in_frame()),
            out_frame.unwrap_or(full.out_frame()),
            total_frames,
        )
    }

    pub fn in_frame(&self) -> FrameIndex {
        FrameIndex(self.in_frame)
    }

    pub fn out_frame(&self) -> FrameIndex {
        FrameIndex(self.out_frame)
    }

    pub fn total_frames(&self) -> u64 {
        self.total
    }

    /// Number of frames in the range.
    pub fn len(&self) -> u64 {
        self.out_frame - self.in_frame + 1
    }

    /// A range always holds at least two frames.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Move the in point, clamped to `[0, out - 1]`. Returns the applied value.
    pub fn set_in(&mut self, frame: FrameIndex) -> FrameIndex {
        self.in_frame = frame.0.min(self.out_frame - 1);
        self.in_frame()
    }

    /// Move the out point, clamped to `[in + 1, total - 1]`. Returns the applied value.
    pub fn set_out(&mut self, frame: FrameIndex) -> FrameIndex {
        self.out_frame = frame.0.clamp(self.in_frame + 1, self.total - 1);
        self.out_frame()
    }

    /// Parse a timecode and move the in point. Leaves the range untouched on error.
    pub fn set_in_timecode(&mut self, tc: &str, fps: f64) -> LaserframeResult<FrameIndex> {
        let frame = parse_timecode(tc, fps)?;
        Ok(self.set_in(frame))
    }

    /// Parse a timecode and move the out point. Leaves the range untouched on error.
    pub fn set_out_timecode(&mut self, tc: &str, fps: f64) -> LaserframeResult<FrameIndex> {
        let frame = parse_timecode(tc, fps)?;
        Ok(self.set_out(frame))
    }

    /// Frame indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = FrameIndex> + use<> {
        (self.in_frame..=self.out_frame).map(FrameIndex)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/timeline.rs"]
mod tests;
