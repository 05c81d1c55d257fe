use image::{GrayImage, RgbImage};

use crate::{
    foundation::core::PixelRect,
    geometry::resolve_region,
    params::ParameterSet,
    render::{composite::composite, edges, tone::apply_tone},
};

/// Which consumer a pass runs for.
///
/// Centerline (multi-pass) extraction only applies to exports; the interactive path always
/// runs the single-pass detector so it stays responsive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassMode {
    Preview,
    Export,
}

/// Output of one frame through geometry, composite, tone and edge extraction.
#[derive(Clone, Debug)]
pub struct PassOutput {
    /// Source rectangle that was sampled.
    pub region: PixelRect,
    /// Edge mask at the output size: 255 on edges, 0 elsewhere.
    pub edges: GrayImage,
}

impl PassOutput {
    /// Bitmap handed to the tracer: edges dark on a light background.
    pub fn trace_input(&self) -> GrayImage {
        edges::invert(&self.edges)
    }
}

/// Run geometry, composite, tone and edge extraction on one decoded frame.
///
/// Returns `None` when the framing resolves to an empty rectangle.
///
/// Pipeline:
/// 1. [`resolve_region`]
/// 2. [`composite`]
/// 3. [`apply_tone`]
/// 4. [`edges::extract_edges`]
#[tracing::instrument(level = "debug", skip(frame, params), fields(w = frame.width(), h = frame.height()))]
pub fn run_pass(frame: &RgbImage, params: &ParameterSet, mode: PassMode) -> Option<PassOutput> {
    let region = resolve_region(
        &params.framing,
        params.square_aspect,
        frame.width(),
        frame.height(),
    )?;
    let composed = composite(frame, region, params.output_size, params.scale_mode)?;
    let toned = apply_tone(
        &composed,
        params.brightness,
        params.contrast,
        params.blur_level,
    );
    let centerline = params.multi_pass && mode == PassMode::Export;
    let edges = edges::extract_edges(&toned, params.thresholds, centerline);
    Some(PassOutput { region, edges })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
