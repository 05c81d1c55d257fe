use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use image::{GrayImage, imageops};

use crate::{
    foundation::{core::FrameIndex, error::LaserframeResult},
    geometry::DisplayLayout,
    media::video::VideoSource,
    params::ParameterSet,
    render::{
        edges::detect_edges,
        pipeline::{PassMode, run_pass},
        tone::apply_tone,
    },
    vectorize::potrace::{PointEstimate, Vectorizer},
};

/// Quiet period after the last change before a pass starts.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(50);

/// Everything one preview pass needs, captured at request time.
#[derive(Clone, Debug)]
pub struct PreviewRequest {
    pub frame: FrameIndex,
    pub params: ParameterSet,
    /// Display canvas size; 0 or 1 falls back to 640x480.
    pub canvas_width: u32,
    pub canvas_height: u32,
}

#[derive(Clone, Debug)]
pub struct PreviewResult {
    pub frame: FrameIndex,
    /// Placement of `display_edges` on the canvas; crop corners are drawn against it.
    pub layout: DisplayLayout,
    /// Edges of the whole toned frame at display size.
    pub display_edges: GrayImage,
    /// Edges of the composited output; `None` when the framing is degenerate.
    pub output_edges: Option<GrayImage>,
    pub estimate: PointEstimate,
}

/// Run one interactive pass: display preview, output preview and point estimate.
///
/// The output preview goes through the same chain as an export pass, minus centerline
/// extraction. Invalid parameters are rejected before the frame is decoded.
pub fn render_preview(
    source: &mut dyn VideoSource,
    vectorizer: &dyn Vectorizer,
    req: &PreviewRequest,
) -> LaserframeResult<PreviewResult> {
    req.params.validate()?;
    let frame = source.read_frame(req.frame)?;
    let p = &req.params;
    let (w, h) = frame.image.dimensions();
    let layout = DisplayLayout::fit(w, h, req.canvas_width, req.canvas_height);

    let toned = apply_tone(&frame.image, p.brightness, p.contrast, p.blur_level);
    let display = imageops::resize(
        &toned,
        layout.image_width,
        layout.image_height,
        imageops::FilterType::Triangle,
    );
    let display_edges = detect_edges(&display, p.thresholds);

    let output = run_pass(&frame.image, p, PassMode::Preview);
    let estimate = match &output {
        Some(out) => vectorizer.estimate(&out.trace_input(), &p.tuning),
        None => PointEstimate::Unavailable,
    };

    Ok(PreviewResult {
        frame: req.frame,
        layout,
        display_edges,
        output_edges: output.map(|o| o.edges),
        estimate,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Settle timer armed.
    Scheduled,
    Running,
}

/// A finished pass tagged with the request generation it answered.
#[derive(Debug)]
pub struct Delivered<T> {
    pub generation: u64,
    pub output: T,
}

struct Shared {
    state: Mutex<SchedulerState>,
    latest: AtomicU64,
    passes: AtomicU64,
    failed: AtomicU64,
}

impl Shared {
    fn set_state(&self, next: SchedulerState) {
        if let Ok(mut s) = self.state.lock()
            && *s != next
        {
            tracing::debug!(from = ?*s, to = ?next, "preview scheduler");
            *s = next;
        }
    }
}

/// Debounced, coalescing driver for preview passes.
///
/// Each [`request`](Self::request) re-arms the settle timer. When it fires, the worker runs the
/// newest request; requests arriving meanwhile collapse into a single follow-up pass. Results
/// come back through [`poll`](Self::poll) / [`wait_timeout`](Self::wait_timeout) on the
/// caller's thread, and results made stale by a newer request are dropped there.
pub struct PreviewScheduler<T> {
    requests: Option<mpsc::Sender<(u64, PreviewRequest)>>,
    results: mpsc::Receiver<Delivered<T>>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> PreviewScheduler<T> {
    pub fn spawn<F>(settle: Duration, mut job: F) -> Self
    where
        F: FnMut(&PreviewRequest) -> T + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<(u64, PreviewRequest)>();
        let (res_tx, res_rx) = mpsc::channel();
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState::Idle),
            latest: AtomicU64::new(0),
            passes: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::spawn(move || {
            let shared = worker_shared;
            let mut pending: Option<(u64, PreviewRequest)> = None;
            loop {
                let Some(current) = pending.take() else {
                    match req_rx.recv() {
                        Ok(next) => {
                            shared.set_state(SchedulerState::Scheduled);
                            pending = Some(next);
                            continue;
                        }
                        Err(_) => break,
                    }
                };
                match req_rx.recv_timeout(settle) {
                    // Newer request: restart the timer with it.
                    Ok(next) => pending = Some(next),
                    Err(RecvTimeoutError::Timeout) => {
                        shared.set_state(SchedulerState::Running);
                        let (generation, req) = current;
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(&req)));
                        shared.passes.fetch_add(1, Ordering::SeqCst);
                        shared.set_state(SchedulerState::Idle);
                        let Ok(output) = outcome else {
                            // The worker keeps serving; only this generation goes unanswered.
                            shared.failed.fetch_add(1, Ordering::SeqCst);
                            tracing::error!(generation, "preview pass panicked");
                            continue;
                        };
                        if res_tx.send(Delivered { generation, output }).is_err() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            shared.set_state(SchedulerState::Idle);
        });

        Self {
            requests: Some(req_tx),
            results: res_rx,
            shared,
            worker: Some(worker),
        }
    }

    /// Queue a pass for `req`, superseding any earlier request. Returns its generation.
    pub fn request(&self, req: PreviewRequest) -> u64 {
        let generation = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(tx) = &self.requests {
            // The worker only exits on drop, so a send failure means we are shutting down.
            let _ = tx.send((generation, req));
        }
        generation
    }

    /// Newest current result, if one has arrived. Never blocks.
    pub fn poll(&self) -> Option<Delivered<T>> {
        let mut fresh = None;
        while let Ok(d) = self.results.try_recv() {
            if self.is_current(&d) {
                fresh = Some(d);
            }
        }
        fresh
    }

    /// Block until a current result arrives or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Delivered<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(left) {
                Ok(d) if self.is_current(&d) => return Some(d),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.shared
            .state
            .lock()
            .map(|s| *s)
            .unwrap_or(SchedulerState::Idle)
    }

    /// Passes actually executed, which is at most the number of requests.
    pub fn passes_run(&self) -> u64 {
        self.shared.passes.load(Ordering::SeqCst)
    }

    /// Passes that panicked and delivered nothing.
    pub fn passes_failed(&self) -> u64 {
        self.shared.failed.load(Ordering::SeqCst)
    }

    fn is_current(&self, d: &Delivered<T>) -> bool {
        let latest = self.shared.latest.load(Ordering::SeqCst);
        if d.generation < latest {
            tracing::debug!(generation = d.generation, latest, "dropping superseded preview");
            return false;
        }
        true
    }
}

impl PreviewScheduler<LaserframeResult<PreviewResult>> {
    /// Scheduler running [`render_preview`] against its own video handle.
    pub fn for_video(
        mut source: Box<dyn VideoSource>,
        vectorizer: Arc<dyn Vectorizer>,
        settle: Duration,
    ) -> Self {
        Self::spawn(settle, move |req| {
            render_preview(source.as_mut(), vectorizer.as_ref(), req)
        })
    }
}

impl<T> Drop for PreviewScheduler<T> {
    fn drop(&mut self) {
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
