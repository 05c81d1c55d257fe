use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use laserframe::{
    ExportController, ExportEvent, ExportRequest, FfmpegVideo, FrameIndex, NullVectorizer,
    ParamId, ParameterSet, PotraceOptions, PotraceVectorizer, PreviewRequest, TimelineRange,
    Vectorizer, VideoSource, format_timecode, parse_timecode,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "laserframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print video dimensions, frame rate and length (requires `ffprobe`).
    Info(InfoArgs),
    /// Render the edge preview of one frame and print the point estimate.
    Preview(PreviewArgs),
    /// Trace a frame range into a numbered SVG sequence (requires `potrace` and `ffmpeg`).
    Export(ExportArgs),
    /// Print the default parameter file and the tunable parameters.
    Params,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Frame as a 0-based index or `HH:MM:SS:FF`.
    #[arg(long, default_value = "0")]
    at: String,

    /// Parameter JSON; missing fields keep their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Output PNG of the composited edge mask.
    #[arg(long)]
    out: PathBuf,

    /// Optional PNG of the full-frame edge preview at display size.
    #[arg(long)]
    display: Option<PathBuf>,

    /// Display canvas width.
    #[arg(long, default_value_t = laserframe::geometry::DEFAULT_CANVAS_WIDTH)]
    canvas_width: u32,

    /// Display canvas height.
    #[arg(long, default_value_t = laserframe::geometry::DEFAULT_CANVAS_HEIGHT)]
    canvas_height: u32,

    /// potrace binary.
    #[arg(long, default_value = "potrace")]
    potrace: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Parameter JSON; missing fields keep their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Folder receiving `<video name>/00001.svg, ...`.
    #[arg(long)]
    out_dir: PathBuf,

    /// In point as a 0-based index or `HH:MM:SS:FF` (default: first frame).
    #[arg(long = "in")]
    in_point: Option<String>,

    /// Out point as a 0-based index or `HH:MM:SS:FF` (default: last frame).
    #[arg(long = "out")]
    out_point: Option<String>,

    /// potrace binary.
    #[arg(long, default_value = "potrace")]
    potrace: PathBuf,

    /// Per-frame potrace timeout in seconds; 0 waits indefinitely.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Export(args) => cmd_export(args),
        Command::Params => cmd_params(),
    }
}

fn load_params(path: Option<&Path>) -> anyhow::Result<ParameterSet> {
    match path {
        Some(p) => Ok(ParameterSet::from_path(p)?),
        None => Ok(ParameterSet::default()),
    }
}

/// `123` or `HH:MM:SS:FF`.
fn parse_frame(s: &str, fps: f64) -> anyhow::Result<FrameIndex> {
    if s.contains(':') {
        return Ok(parse_timecode(s, fps)?);
    }
    let n = s
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid frame \"{s}\" (expected an index or HH:MM:SS:FF)"))?;
    Ok(FrameIndex(n))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let video = FfmpegVideo::open(&args.video)?;
    let info = video.info();
    println!("{}", serde_json::to_string_pretty(info)?);
    if let Some(last) = info.last_frame() {
        println!("duration: {}", format_timecode(last, info.fps));
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let params = load_params(args.params.as_deref())?;
    let mut video = FfmpegVideo::open(&args.video)?;
    let fps = video.info().fps;
    let frame = parse_frame(&args.at, fps)?;

    let vectorizer: Box<dyn Vectorizer> = match PotraceVectorizer::locate(PotraceOptions {
        binary: args.potrace.clone(),
        ..PotraceOptions::default()
    }) {
        Ok(v) => Box::new(v),
        Err(e) => {
            tracing::warn!(error = %e, "point estimate disabled");
            Box::new(NullVectorizer)
        }
    };

    let req = PreviewRequest {
        frame,
        params,
        canvas_width: args.canvas_width,
        canvas_height: args.canvas_height,
    };
    let res = laserframe::render_preview(&mut video, vectorizer.as_ref(), &req)?;

    if let Some(path) = &args.display {
        res.display_edges
            .save(path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    match &res.output_edges {
        Some(edges) => {
            edges
                .save(&args.out)
                .with_context(|| format!("write png '{}'", args.out.display()))?;
            eprintln!("wrote {}", args.out.display());
        }
        None => eprintln!("framing resolves to an empty region; no output preview"),
    }
    println!(
        "{}  point estimate: {}",
        format_timecode(res.frame, fps),
        res.estimate
    );
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let params = load_params(args.params.as_deref())?;
    let video = FfmpegVideo::open(&args.video)?;
    let info = video.info().clone();
    let in_point = args
        .in_point
        .as_deref()
        .map(|s| parse_frame(s, info.fps))
        .transpose()?;
    let out_point = args
        .out_point
        .as_deref()
        .map(|s| parse_frame(s, info.fps))
        .transpose()?;
    let range = TimelineRange::with_bounds(in_point, out_point, info.frame_count)?;

    let vectorizer = PotraceVectorizer::locate(PotraceOptions {
        binary: args.potrace.clone(),
        export_timeout: (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs)),
        ..PotraceOptions::default()
    })?;
    tracing::info!(version = vectorizer.version(), frames = range.len(), "exporting");

    let req = ExportRequest {
        params,
        range,
        output_root: args.out_dir,
        folder_name: info.name(),
    };
    let controller = ExportController::new();
    let job = controller.start(Box::new(video), Arc::new(vectorizer), req)?;

    for event in job.events.iter() {
        match event {
            ExportEvent::Progress { done, total } => {
                eprint!("\rexporting {done}/{total}");
            }
            ExportEvent::FrameSkipped { frame, reason } => {
                eprintln!("\rskipped frame {}: {reason}", frame.0);
            }
            ExportEvent::Completed(report) => {
                eprintln!();
                println!(
                    "wrote {} documents to {} ({} skipped)",
                    report.written,
                    report.folder.display(),
                    report.skipped
                );
            }
            ExportEvent::Failed(msg) => {
                eprintln!();
                eprintln!("export failed: {msg}");
            }
            ExportEvent::FrameWritten { .. } => {}
        }
    }
    job.wait()?;
    Ok(())
}

fn cmd_params() -> anyhow::Result<()> {
    let defaults = ParameterSet::default();
    println!("{}", defaults.to_json_pretty()?);
    eprintln!("tunable parameters:");
    for id in ParamId::ALL {
        let (lo, hi) = id.range();
        eprintln!(
            "  {:<22} {:>8} .. {:<8} default {}",
            id.label(),
            id.format_value(lo),
            id.format_value(hi),
            id.format_value(defaults.value(id))
        );
    }
    Ok(())
}
