use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;

use crate::foundation::{
    core::FrameIndex,
    error::{LaserframeError, LaserframeResult},
};

/// Frame rate assumed when the container does not report a usable one.
pub const FALLBACK_FPS: f64 = 30.0;

/// One decoded source frame (RGB8, straight).
#[derive(Clone, Debug)]
pub struct Frame {
    pub index: FrameIndex,
    pub image: RgbImage,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoInfo {
    /// File stem of the source, used to name the export folder.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "video".to_string())
    }

    /// Last valid frame index, `None` for an empty video.
    pub fn last_frame(&self) -> Option<FrameIndex> {
        self.frame_count.checked_sub(1).map(FrameIndex)
    }
}

/// Seekable frame source.
///
/// Handles are not shared: the preview path and an export job each own their own source so
/// seeks never contend.
pub trait VideoSource: Send {
    fn info(&self) -> &VideoInfo;

    /// Seek to `index` and decode it. Past the end of the stream this is a `Decode` error.
    fn read_frame(&mut self, index: FrameIndex) -> LaserframeResult<Frame>;
}

pub fn is_ffmpeg_on_path() -> bool {
    tool_responds("ffmpeg") && tool_responds("ffprobe")
}

fn tool_responds(bin: &str) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Video file decoded through the system `ffprobe`/`ffmpeg` binaries.
#[derive(Debug)]
pub struct FfmpegVideo {
    info: VideoInfo,
}

impl FfmpegVideo {
    pub fn open(path: &Path) -> LaserframeResult<Self> {
        if !path.is_file() {
            return Err(LaserframeError::validation(format!(
                "video file '{}' does not exist",
                path.display()
            )));
        }
        let info = probe(path)?;
        tracing::debug!(
            path = %info.path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "opened video"
        );
        Ok(Self { info })
    }
}

impl VideoSource for FfmpegVideo {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self, index: FrameIndex) -> LaserframeResult<Frame> {
        if index.0 >= self.info.frame_count {
            return Err(LaserframeError::decode(format!(
                "frame {} is past the end of the stream ({} frames)",
                index.0, self.info.frame_count
            )));
        }
        let seek = seek_time_sec(index, self.info.fps);
        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{seek:.9}")])
            .arg("-i")
            .arg(&self.info.path)
            .args([
                "-frames:v",
                "1",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| LaserframeError::decode(format!("failed to run ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(LaserframeError::decode(format!(
                "ffmpeg decode of frame {} failed: {}",
                index.0,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let expected = self.info.width as usize * self.info.height as usize * 3;
        if out.stdout.len() < expected {
            return Err(LaserframeError::decode(format!(
                "frame {}: got {} bytes, expected {expected} (end of stream?)",
                index.0,
                out.stdout.len()
            )));
        }
        let mut bytes = out.stdout;
        bytes.truncate(expected);
        let image = RgbImage::from_raw(self.info.width, self.info.height, bytes)
            .ok_or_else(|| LaserframeError::decode("decoded frame buffer has the wrong size"))?;
        Ok(Frame { index, image })
    }
}

/// Input-side seek target for frame `index`.
///
/// Backed off a quarter frame so the first frame at or after the target is `index` itself.
fn seek_time_sec(index: FrameIndex, fps: f64) -> f64 {
    ((index.0 as f64 - 0.25) / fps).max(0.0)
}

fn probe(path: &Path) -> LaserframeResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            LaserframeError::unavailable(format!("failed to run ffprobe (is it on PATH?): {e}"))
        })?;
    if !out.status.success() {
        return Err(LaserframeError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| LaserframeError::serde(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| LaserframeError::decode("no video stream found"))?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(LaserframeError::decode("missing video dimensions from ffprobe")),
    };

    let fps = [&stream.avg_frame_rate, &stream.r_frame_rate]
        .into_iter()
        .filter_map(|r| r.as_deref().and_then(parse_ff_ratio))
        .next()
        .unwrap_or(FALLBACK_FPS);

    let frame_count = match stream.nb_frames.as_deref().and_then(|s| s.parse::<u64>().ok()) {
        Some(n) if n > 0 => n,
        _ => {
            let duration = stream
                .duration
                .as_deref()
                .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(0.0);
            (duration * fps).round() as u64
        }
    };

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps,
        frame_count,
    })
}

/// Parse an ffprobe `num/den` rate. Zero or malformed rates are `None`.
fn parse_ff_ratio(s: &str) -> Option<f64> {
    let (a, b) = s.split_once('/')?;
    let a = a.trim().parse::<u32>().ok()?;
    let b = b.trim().parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some(f64::from(a) / f64::from(b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/video.rs"]
mod tests;
