use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::FrameIndex,
        error::{LaserframeError, LaserframeResult},
    },
    media::{timeline::TimelineRange, video::VideoSource},
    params::ParameterSet,
    render::pipeline::{PassMode, run_pass},
    vectorize::{potrace::Vectorizer, svg::DocumentStats},
};

/// One batch run: a frame range traced into `output_root/folder_name/00001.svg, ...`.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub params: ParameterSet,
    pub range: TimelineRange,
    pub output_root: PathBuf,
    /// Destination folder name, normally the video's file stem.
    pub folder_name: String,
}

impl ExportRequest {
    /// Reject bad input before any frame is touched.
    pub fn validate(&self, frame_count: u64) -> LaserframeResult<()> {
        self.params.validate()?;
        if self.output_root.as_os_str().is_empty() {
            return Err(LaserframeError::validation("no output folder selected"));
        }
        if self.output_root.exists() && !self.output_root.is_dir() {
            return Err(LaserframeError::validation(format!(
                "output path '{}' is not a folder",
                self.output_root.display()
            )));
        }
        let name = self.folder_name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(LaserframeError::validation(format!(
                "invalid export folder name \"{}\"",
                self.folder_name
            )));
        }
        if self.range.out_frame().0 >= frame_count {
            return Err(LaserframeError::validation(format!(
                "out frame {} is past the end of the video ({frame_count} frames)",
                self.range.out_frame().0
            )));
        }
        Ok(())
    }

    pub fn folder(&self) -> PathBuf {
        self.output_root.join(self.folder_name.trim())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExportReport {
    pub folder: PathBuf,
    pub written: u64,
    pub skipped: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExportEvent {
    /// `done` of `total` frames processed, written or skipped.
    Progress { done: u64, total: u64 },
    FrameWritten {
        frame: FrameIndex,
        sequence: u64,
        path: PathBuf,
        stats: DocumentStats,
    },
    FrameSkipped { frame: FrameIndex, reason: String },
    Completed(ExportReport),
    Failed(String),
}

impl ExportEvent {
    /// Progress as a fraction in `[0, 1]`, for `Progress` events.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Progress { done, total } if *total > 0 => Some(*done as f64 / *total as f64),
            _ => None,
        }
    }
}

/// File name for the `sequence`-th written document (1-based).
pub fn document_name(sequence: u64) -> String {
    format!("{sequence:05}.svg")
}

/// Trace every frame of `req.range` in order.
///
/// Decode failures and degenerate framing skip the frame without consuming a sequence number.
/// The first vectorizer failure stops the run; documents already written stay on disk.
pub fn export_range(
    source: &mut dyn VideoSource,
    vectorizer: &dyn Vectorizer,
    req: &ExportRequest,
    on_event: &mut dyn FnMut(ExportEvent),
) -> LaserframeResult<ExportReport> {
    req.validate(source.info().frame_count)?;
    let folder = req.folder();
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("failed to create export folder '{}'", folder.display()))?;

    let total = req.range.len();
    let mut report = ExportReport {
        folder: folder.clone(),
        written: 0,
        skipped: 0,
    };
    tracing::info!(
        folder = %folder.display(),
        from = req.range.in_frame().0,
        to = req.range.out_frame().0,
        "export started"
    );

    for (done, index) in req.range.iter().enumerate() {
        match export_frame(source, vectorizer, req, index, &folder, report.written + 1) {
            Ok(Some((path, stats))) => {
                report.written += 1;
                tracing::info!(
                    frame = index.0,
                    file = %path.display(),
                    paths = stats.paths,
                    segments = stats.segments,
                    "frame written"
                );
                on_event(ExportEvent::FrameWritten {
                    frame: index,
                    sequence: report.written,
                    path,
                    stats,
                });
            }
            Ok(None) => {
                report.skipped += 1;
                tracing::warn!(frame = index.0, "frame skipped: empty framing");
                on_event(ExportEvent::FrameSkipped {
                    frame: index,
                    reason: "framing resolves to an empty region".to_string(),
                });
            }
            Err(e) if e.is_frame_local() => {
                report.skipped += 1;
                tracing::warn!(frame = index.0, error = %e, "frame skipped");
                on_event(ExportEvent::FrameSkipped {
                    frame: index,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(frame = index.0, error = %e, "export aborted");
                return Err(e);
            }
        }
        on_event(ExportEvent::Progress {
            done: done as u64 + 1,
            total,
        });
    }

    tracing::info!(written = report.written, skipped = report.skipped, "export finished");
    Ok(report)
}

fn export_frame(
    source: &mut dyn VideoSource,
    vectorizer: &dyn Vectorizer,
    req: &ExportRequest,
    index: FrameIndex,
    folder: &Path,
    sequence: u64,
) -> LaserframeResult<Option<(PathBuf, DocumentStats)>> {
    let frame = source.read_frame(index)?;
    let Some(pass) = run_pass(&frame.image, &req.params, PassMode::Export) else {
        return Ok(None);
    };
    let path = folder.join(document_name(sequence));
    let stats = vectorizer.export(
        &pass.trace_input(),
        &req.params.tuning,
        req.params.stroke,
        &path,
    )?;
    Ok(Some((path, stats)))
}

/// Handle on a background export.
#[derive(Debug)]
pub struct ExportJob {
    pub events: mpsc::Receiver<ExportEvent>,
    handle: JoinHandle<LaserframeResult<ExportReport>>,
}

impl ExportJob {
    /// Block until the run ends.
    pub fn wait(self) -> LaserframeResult<ExportReport> {
        self.handle
            .join()
            .map_err(|_| LaserframeError::Other(anyhow::anyhow!("export worker panicked")))?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Starts background exports, at most one at a time.
#[derive(Clone, Debug, Default)]
pub struct ExportController {
    running: Arc<AtomicBool>,
}

struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ExportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Validate and start `req` on a worker thread that owns `source`.
    ///
    /// Fails without side effects when the request is invalid or another export is running.
    pub fn start(
        &self,
        mut source: Box<dyn VideoSource>,
        vectorizer: Arc<dyn Vectorizer>,
        req: ExportRequest,
    ) -> LaserframeResult<ExportJob> {
        req.validate(source.info().frame_count)?;
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(LaserframeError::validation("an export is already running"));
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("laserframe-export".to_string())
            .spawn(move || {
                let _guard = guard;
                let mut forward = |ev: ExportEvent| {
                    let _ = tx.send(ev);
                };
                let result = export_range(source.as_mut(), vectorizer.as_ref(), &req, &mut forward);
                match &result {
                    Ok(report) => forward(ExportEvent::Completed(report.clone())),
                    Err(e) => forward(ExportEvent::Failed(e.to_string())),
                }
                result
            })
            .context("failed to spawn export worker")?;

        Ok(ExportJob { events: rx, handle })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
