#![forbid(unsafe_code)]

pub mod foundation;
pub mod geometry;
pub mod media;
pub mod params;
pub mod render;
pub mod session;
pub mod vectorize;

pub use foundation::core::{FrameIndex, OutputSize, PixelRect, Point, Rect};
pub use foundation::error::{LaserframeError, LaserframeResult};
pub use foundation::timecode::{format_timecode, parse_timecode};
pub use geometry::{CropSelection, DisplayLayout, resolve_region};
pub use media::timeline::TimelineRange;
pub use media::video::{FfmpegVideo, Frame, VideoInfo, VideoSource, is_ffmpeg_on_path};
pub use params::{
    EdgeThresholds, Framing, NumericKind, ParamId, ParameterSet, ScaleMode, StrokeColor,
    VectorizerTuning,
};
pub use render::pipeline::{PassMode, PassOutput, run_pass};
pub use session::export::{
    ExportController, ExportEvent, ExportJob, ExportReport, ExportRequest, export_range,
};
pub use session::preview::{
    PreviewRequest, PreviewResult, PreviewScheduler, SchedulerState, render_preview,
};
pub use vectorize::potrace::{
    NullVectorizer, PointEstimate, PotraceOptions, PotraceVectorizer, Vectorizer,
};
pub use vectorize::svg::DocumentStats;
