use super::*;
use crate::foundation::core::{OutputSize, Point};
use crate::foundation::error::LaserframeError;
use crate::geometry::CropSelection;
use crate::media::video::{Frame, VideoInfo};
use crate::params::{EdgeThresholds, StrokeColor, VectorizerTuning};
use crate::vectorize::svg::DocumentStats;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

struct Still {
    info: VideoInfo,
}

impl Still {
    fn new(w: u32, h: u32) -> Self {
        Self {
            info: VideoInfo {
                path: PathBuf::from("still.mp4"),
                width: w,
                height: h,
                fps: 30.0,
                frame_count: 10,
            },
        }
    }
}

impl VideoSource for Still {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn read_frame(&mut self, index: FrameIndex) -> LaserframeResult<Frame> {
        if index.0 >= self.info.frame_count {
            return Err(LaserframeError::decode("end of stream"));
        }
        let (w, h) = (self.info.width, self.info.height);
        let image = RgbImage::from_fn(w, h, |x, y| {
            if x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4 {
                Rgb([240, 240, 240])
            } else {
                Rgb([10, 10, 10])
            }
        });
        Ok(Frame { index, image })
    }
}

/// Counts dark pixels instead of tracing.
struct InkCounter;

impl Vectorizer for InkCounter {
    fn estimate(&self, bitmap: &GrayImage, _tuning: &VectorizerTuning) -> PointEstimate {
        PointEstimate::Count(bitmap.pixels().filter(|p| p.0[0] == 0).count() as u64)
    }

    fn export(
        &self,
        _bitmap: &GrayImage,
        _tuning: &VectorizerTuning,
        _stroke: StrokeColor,
        _dest: &Path,
    ) -> LaserframeResult<DocumentStats> {
        Err(LaserframeError::vectorize("preview never exports"))
    }
}

fn request(frame: u64, params: ParameterSet) -> PreviewRequest {
    PreviewRequest {
        frame: FrameIndex(frame),
        params,
        canvas_width: 320,
        canvas_height: 240,
    }
}

fn small_output() -> ParameterSet {
    ParameterSet {
        output_size: OutputSize::square(48).unwrap(),
        ..ParameterSet::default()
    }
}

#[test]
fn preview_fills_display_and_output() {
    let mut src = Still::new(160, 90);
    let res = render_preview(&mut src, &InkCounter, &request(3, small_output())).unwrap();

    assert_eq!(res.frame, FrameIndex(3));
    // 160x90 on 320x240: 320x180, 30 px bars top and bottom.
    assert_eq!((res.layout.image_width, res.layout.image_height), (320, 180));
    assert_eq!((res.layout.offset_x, res.layout.offset_y), (0, 30));
    assert_eq!(res.display_edges.dimensions(), (320, 180));

    let out = res.output_edges.unwrap();
    assert_eq!(out.dimensions(), (48, 48));
    let lit = out.pixels().filter(|p| p.0[0] != 0).count() as u64;
    assert!(lit > 0);
    assert_eq!(res.estimate, PointEstimate::Count(lit));
}

#[test]
fn degenerate_crop_keeps_display_but_drops_output() {
    let mut src = Still::new(160, 90);
    let layout = DisplayLayout::fit(160, 90, 320, 240);
    let p = Point::new(50.0, 50.0);
    let params = small_output().with_crop(CropSelection::new(p, p, layout));
    let res = render_preview(&mut src, &InkCounter, &request(0, params)).unwrap();

    assert!(res.output_edges.is_none());
    assert_eq!(res.estimate, PointEstimate::Unavailable);
    assert_eq!(res.display_edges.dimensions(), (320, 180));
}

#[test]
fn decode_failure_surfaces() {
    let mut src = Still::new(16, 16);
    let err = render_preview(&mut src, &InkCounter, &request(99, small_output())).unwrap_err();
    assert!(err.is_frame_local());
}

#[test]
fn scheduler_runs_latest_request_and_goes_idle() {
    let sched = PreviewScheduler::spawn(Duration::from_millis(20), |req: &PreviewRequest| req.frame);
    assert_eq!(sched.state(), SchedulerState::Idle);

    let generation = sched.request(request(7, small_output()));
    let got = sched.wait_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(got.generation, generation);
    assert_eq!(got.output, FrameIndex(7));
    assert_eq!(sched.passes_run(), 1);
    assert!(sched.poll().is_none());
}

#[test]
fn scheduler_drives_render_preview_on_its_own_handle() {
    let sched = PreviewScheduler::for_video(
        Box::new(Still::new(64, 64)),
        Arc::new(InkCounter),
        Duration::from_millis(10),
    );
    sched.request(request(1, small_output()));
    let got = sched.wait_timeout(Duration::from_secs(10)).unwrap();
    let res = got.output.unwrap();
    assert_eq!(res.frame, FrameIndex(1));
    assert!(res.output_edges.is_some());
}

#[test]
fn inverted_thresholds_are_rejected_before_decoding() {
    let mut src = Still::new(32, 32);
    let params = ParameterSet {
        thresholds: EdgeThresholds { low: 200, high: 100 },
        ..small_output()
    };
    // Frame 99 does not exist: a validation error proves nothing was decoded.
    let err = render_preview(&mut src, &InkCounter, &request(99, params)).unwrap_err();
    assert!(matches!(err, LaserframeError::Validation(_)), "{err}");
}

#[test]
fn scheduler_survives_a_panicking_pass() {
    let sched = PreviewScheduler::spawn(Duration::from_millis(10), |req: &PreviewRequest| {
        assert!(req.frame != FrameIndex(0), "bad frame");
        req.frame
    });
    sched.request(request(0, small_output()));
    let deadline = Instant::now() + Duration::from_secs(5);
    while sched.passes_failed() == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(sched.passes_failed(), 1);

    let generation = sched.request(request(4, small_output()));
    let got = sched.wait_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!((got.generation, got.output), (generation, FrameIndex(4)));
    assert_eq!(sched.passes_run(), 2);
}

#[test]
fn scheduled_render_reports_invalid_params_and_keeps_going() {
    let sched = PreviewScheduler::for_video(
        Box::new(Still::new(64, 64)),
        Arc::new(InkCounter),
        Duration::from_millis(10),
    );
    let bad = ParameterSet {
        thresholds: EdgeThresholds { low: 200, high: 100 },
        ..small_output()
    };
    sched.request(request(1, bad));
    let first = sched.wait_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(first.output, Err(LaserframeError::Validation(_))));

    sched.request(request(2, small_output()));
    let second = sched.wait_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(second.output.unwrap().frame, FrameIndex(2));
}
