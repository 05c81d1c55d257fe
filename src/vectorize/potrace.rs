use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use image::GrayImage;

use crate::{
    foundation::error::{LaserframeError, LaserframeResult},
    params::{StrokeColor, VectorizerTuning},
    vectorize::{
        bitmap::{encode_bmp, write_bmp},
        process::run_with_timeout,
        svg::{DocumentStats, colorize_file, inspect_document},
    },
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Live drawing-complexity estimate for the preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointEstimate {
    Count(u64),
    /// The tracer failed or timed out; the preview carries on without a number.
    Unavailable,
}

impl fmt::Display for PointEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "~{n}"),
            Self::Unavailable => f.write_str("---"),
        }
    }
}

/// Bitmap-to-vector tracer.
///
/// Inputs are trace bitmaps: dark foreground on a light background.
pub trait Vectorizer: Send + Sync {
    /// Quick, bounded trace used for the preview. Never fails.
    fn estimate(&self, bitmap: &GrayImage, tuning: &VectorizerTuning) -> PointEstimate;

    /// Trace to `dest` and color every path with `stroke`. Any failure is fatal for a batch.
    fn export(
        &self,
        bitmap: &GrayImage,
        tuning: &VectorizerTuning,
        stroke: StrokeColor,
        dest: &Path,
    ) -> LaserframeResult<DocumentStats>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PotraceOptions {
    pub binary: PathBuf,
    pub estimate_timeout: Duration,
    /// `None` waits indefinitely.
    pub export_timeout: Option<Duration>,
}

impl Default for PotraceOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("potrace"),
            estimate_timeout: Duration::from_secs(1),
            export_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// [`Vectorizer`] backed by the `potrace` command-line tool (SVG backend).
#[derive(Clone, Debug)]
pub struct PotraceVectorizer {
    opts: PotraceOptions,
    version: String,
}

impl PotraceVectorizer {
    /// Check that the binary runs. A missing tool is `Unavailable`.
    pub fn locate(opts: PotraceOptions) -> LaserframeResult<Self> {
        let mut cmd = Command::new(&opts.binary);
        cmd.arg("--version");
        let out = run_with_timeout(cmd, None, Some(PROBE_TIMEOUT))
            .and_then(|o| o.into_success("potrace --version"))
            .map_err(|e| {
                LaserframeError::unavailable(format!(
                    "'{}' not found or not working ({e}); install potrace to export",
                    opts.binary.display()
                ))
            })?;
        let version = String::from_utf8_lossy(&out)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        tracing::debug!(%version, "located potrace");
        Ok(Self { opts, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn command(&self, input: &str, tuning: &VectorizerTuning) -> Command {
        let mut cmd = Command::new(&self.opts.binary);
        cmd.arg(input).arg("-s").args(tuning_args(tuning));
        cmd
    }
}

impl Vectorizer for PotraceVectorizer {
    fn estimate(&self, bitmap: &GrayImage, tuning: &VectorizerTuning) -> PointEstimate {
        let traced = encode_bmp(bitmap).and_then(|bmp| {
            let mut cmd = self.command("-", tuning);
            cmd.args(["-o", "-"]);
            run_with_timeout(cmd, Some(bmp.as_slice()), Some(self.opts.estimate_timeout))?
                .into_success("potrace")
        });
        match traced.and_then(|svg| inspect_document(&svg)) {
            Ok(stats) => PointEstimate::Count(stats.segments),
            Err(e) => {
                tracing::warn!(error = %e, "point estimate unavailable");
                PointEstimate::Unavailable
            }
        }
    }

    fn export(
        &self,
        bitmap: &GrayImage,
        tuning: &VectorizerTuning,
        stroke: StrokeColor,
        dest: &Path,
    ) -> LaserframeResult<DocumentStats> {
        let tmp = TempBitmap::beside(dest);
        write_bmp(bitmap, tmp.path())?;

        let mut cmd = self.command(&tmp.path().to_string_lossy(), tuning);
        cmd.arg("-o").arg(dest);
        run_with_timeout(cmd, None, self.opts.export_timeout)?.into_success("potrace")?;

        colorize_file(dest, stroke)?;
        let doc = std::fs::read(dest).map_err(|e| {
            LaserframeError::vectorize(format!(
                "potrace produced no document at '{}': {e}",
                dest.display()
            ))
        })?;
        inspect_document(&doc)
    }
}

/// Stand-in when no tracer is installed: previews still run, exports are refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullVectorizer;

impl Vectorizer for NullVectorizer {
    fn estimate(&self, _bitmap: &GrayImage, _tuning: &VectorizerTuning) -> PointEstimate {
        PointEstimate::Unavailable
    }

    fn export(
        &self,
        _bitmap: &GrayImage,
        _tuning: &VectorizerTuning,
        _stroke: StrokeColor,
        _dest: &Path,
    ) -> LaserframeResult<DocumentStats> {
        Err(LaserframeError::unavailable("no vectorizer installed"))
    }
}

/// `--turdsize`, `--opttolerance` and `--alphamax` for one invocation.
fn tuning_args(tuning: &VectorizerTuning) -> Vec<String> {
    vec![
        "--turdsize".to_string(),
        tuning.speckle.to_string(),
        "--opttolerance".to_string(),
        tuning.opt_tolerance.to_string(),
        "--alphamax".to_string(),
        tuning.alpha_max.to_string(),
    ]
}

/// Scratch bitmap next to the destination document, removed on drop.
struct TempBitmap {
    path: PathBuf,
}

impl TempBitmap {
    fn beside(dest: &Path) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let name = format!(".laserframe-{}-{n}.bmp", std::process::id());
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            path: dir.join(name),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempBitmap {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vectorize/potrace.rs"]
mod tests;
