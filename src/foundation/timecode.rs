//! `HH:MM:SS:FF` timecodes (frame-within-second last) against a possibly fractional frame rate.

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LaserframeError, LaserframeResult};

/// Format `frame` as `HH:MM:SS:FF` for the given frame rate.
///
/// A non-positive or non-finite `fps` formats as all zeros.
pub fn format_timecode(frame: FrameIndex, fps: f64) -> String {
    if !fps.is_finite() || fps <= 0.0 {
        return "00:00:00:00".to_owned();
    }
    let frame_f = frame.0 as f64;
    let seconds_total = frame_f / fps;
    let hours = (seconds_total / 3600.0).floor();
    let minutes = ((seconds_total % 3600.0) / 60.0).floor();
    let seconds = (seconds_total % 60.0).floor();
    let frames = (frame_f % fps).floor();
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        hours as u64, minutes as u64, seconds as u64, frames as u64
    )
}

/// Parse `HH:MM:SS:FF` into a frame index for the given frame rate.
///
/// Minutes and seconds must be below 60 and the frame field below `ceil(fps)`.
pub fn parse_timecode(s: &str, fps: f64) -> LaserframeResult<FrameIndex> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(LaserframeError::validation(
            "timecode parsing needs a positive frame rate",
        ));
    }

    let parts: Vec<&str> = s.trim().split(':').collect();
    let [h, m, sec, f] = parts.as_slice() else {
        return Err(LaserframeError::validation(format!(
            "timecode \"{s}\" must have the form HH:MM:SS:FF"
        )));
    };

    fn field(name: &str, raw: &str) -> LaserframeResult<u64> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LaserframeError::validation(format!(
                "timecode {name} field \"{raw}\" is not a number"
            )));
        }
        raw.parse::<u64>().map_err(|e| {
            LaserframeError::validation(format!("timecode {name} field \"{raw}\": {e}"))
        })
    }

    let h = field("hours", h)?;
    let m = field("minutes", m)?;
    let sec = field("seconds", sec)?;
    let f = field("frames", f)?;

    if m >= 60 || sec >= 60 {
        return Err(LaserframeError::validation(format!(
            "timecode \"{s}\" has minutes/seconds out of range"
        )));
    }
    if f as f64 >= fps.ceil() {
        return Err(LaserframeError::validation(format!(
            "timecode \"{s}\" frame field must be below {}",
            fps.ceil()
        )));
    }

    let whole_seconds = (h * 3600 + m * 60 + sec) as f64;
    let base = (whole_seconds * fps).round() as u64;
    Ok(FrameIndex(base + f))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/timecode.rs"]
mod tests;
