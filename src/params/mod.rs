//! Parameter Set: an immutable snapshot of every knob one pipeline pass reads.
//!
//! The interactive surface builds a new [`ParameterSet`] whenever a control changes and passes
//! it by value into the preview scheduler or the batch exporter. Nothing in the pipeline reads
//! live control state.

mod color;
mod schema;

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub use color::StrokeColor;
pub use schema::{NumericKind, ParamId};

use crate::foundation::core::OutputSize;
use crate::foundation::error::{LaserframeError, LaserframeResult};
use crate::geometry::CropSelection;

/// Largest corner threshold potrace accepts as meaningful (`4/3`, corners fully rounded).
pub const ALPHA_MAX_LIMIT: f64 = 1.3334;

/// Which part of the source frame feeds the compositor. Exactly one mode is active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Framing {
    /// Window of `frame / zoom` size, panned by normalized offsets in `[-1, 1]`.
    ZoomPan { zoom: f64, pan_x: f64, pan_y: f64 },
    /// Rectangle drawn on the preview canvas.
    Crop(CropSelection),
}

impl Default for Framing {
    fn default() -> Self {
        Self::ZoomPan {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Policy for placing the resolved region on the fixed-size output canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Uniform scale, whole region visible, remaining canvas is background.
    Fit,
    /// Uniform scale, canvas fully covered, overflow trimmed symmetrically.
    #[default]
    Fill,
    /// Non-uniform scale to exactly the canvas size.
    Stretch,
}

/// Two-threshold edge detector settings (`low <= high`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeThresholds {
    pub low: u8,
    pub high: u8,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self { low: 50, high: 150 }
    }
}

/// Tuning forwarded to the external vectorizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerTuning {
    /// Speckle suppression: connected regions up to this many pixels are dropped (`turdsize`).
    pub speckle: u32,
    /// Curve optimization tolerance (`opttolerance`).
    pub opt_tolerance: f64,
    /// Corner threshold (`alphamax`); larger values round corners.
    pub alpha_max: f64,
}

impl Default for VectorizerTuning {
    fn default() -> Self {
        Self {
            speckle: 2,
            opt_tolerance: 0.2,
            alpha_max: 1.0,
        }
    }
}

/// Full configuration for one pipeline pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    pub framing: Framing,
    pub square_aspect: bool,
    pub scale_mode: ScaleMode,
    pub output_size: OutputSize,
    pub brightness: i32,
    pub contrast: f64,
    pub blur_level: u32,
    pub thresholds: EdgeThresholds,
    /// Thin edges to a skeleton before tracing (export passes only).
    pub multi_pass: bool,
    pub tuning: VectorizerTuning,
    pub stroke: StrokeColor,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            square_aspect: true,
            scale_mode: ScaleMode::Fill,
            output_size: OutputSize::default(),
            brightness: 0,
            contrast: 1.0,
            blur_level: 0,
            thresholds: EdgeThresholds::default(),
            multi_pass: false,
            tuning: VectorizerTuning::default(),
            stroke: StrokeColor::BLACK,
        }
    }
}

impl ParameterSet {
    /// Load a (possibly partial) JSON parameter file; missing fields keep their defaults.
    pub fn from_path(path: &Path) -> LaserframeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read parameter file '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> LaserframeResult<Self> {
        let params: Self = serde_json::from_str(text)
            .map_err(|e| LaserframeError::serde(format!("parameter json: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_pretty(&self) -> LaserframeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LaserframeError::serde(e.to_string()))
    }

    /// Check every cross-field and range invariant.
    pub fn validate(&self) -> LaserframeResult<()> {
        if let Framing::ZoomPan { zoom, pan_x, pan_y } = self.framing {
            if !zoom.is_finite() || zoom < 1.0 {
                return Err(LaserframeError::validation("zoom must be finite and >= 1.0"));
            }
            for (axis, pan) in [("x", pan_x), ("y", pan_y)] {
                if !pan.is_finite() || !(-1.0..=1.0).contains(&pan) {
                    return Err(LaserframeError::validation(format!(
                        "pan_{axis} must be within [-1, 1]"
                    )));
                }
            }
        }
        OutputSize::new(self.output_size.width, self.output_size.height)?;
        if !self.contrast.is_finite() || self.contrast < 0.0 {
            return Err(LaserframeError::validation(
                "contrast must be finite and >= 0",
            ));
        }
        if self.thresholds.low > self.thresholds.high {
            return Err(LaserframeError::validation(format!(
                "edge thresholds must satisfy low <= high (got {} > {})",
                self.thresholds.low, self.thresholds.high
            )));
        }
        let t = &self.tuning;
        if !t.opt_tolerance.is_finite() || t.opt_tolerance < 0.0 {
            return Err(LaserframeError::validation(
                "opt_tolerance must be finite and >= 0",
            ));
        }
        if !t.alpha_max.is_finite() || !(0.0..=ALPHA_MAX_LIMIT).contains(&t.alpha_max) {
            return Err(LaserframeError::validation(format!(
                "alpha_max must be within [0, {ALPHA_MAX_LIMIT}]"
            )));
        }
        Ok(())
    }

    /// Current value of a slider parameter.
    ///
    /// Zoom/pan read as their neutral values while crop framing is active.
    pub fn value(&self, id: ParamId) -> f64 {
        let (zoom, pan_x, pan_y) = match self.framing {
            Framing::ZoomPan { zoom, pan_x, pan_y } => (zoom, pan_x, pan_y),
            Framing::Crop(_) => (1.0, 0.0, 0.0),
        };
        match id {
            ParamId::Zoom => zoom,
            ParamId::PanX => pan_x,
            ParamId::PanY => pan_y,
            ParamId::Brightness => f64::from(self.brightness),
            ParamId::Contrast => self.contrast,
            ParamId::BlurLevel => f64::from(self.blur_level),
            ParamId::LowThreshold => f64::from(self.thresholds.low),
            ParamId::HighThreshold => f64::from(self.thresholds.high),
            ParamId::Speckle => f64::from(self.tuning.speckle),
            ParamId::OptTolerance => self.tuning.opt_tolerance,
            ParamId::AlphaMax => self.tuning.alpha_max,
        }
    }

    /// Return a copy with one slider parameter changed.
    ///
    /// The value is clamped to the parameter's range and rounded for integer kinds. Zoom/pan
    /// are rejected while crop framing is active, and a threshold edit that would cross the
    /// other threshold is rejected.
    pub fn with_value(&self, id: ParamId, value: f64) -> LaserframeResult<Self> {
        if !value.is_finite() {
            return Err(LaserframeError::validation(format!(
                "{} must be a finite number",
                id.label()
            )));
        }
        let v = id.normalize(value);
        let mut next = self.clone();
        match id {
            ParamId::Zoom | ParamId::PanX | ParamId::PanY => {
                let Framing::ZoomPan { zoom, pan_x, pan_y } = &mut next.framing else {
                    return Err(LaserframeError::validation(format!(
                        "{} is disabled while crop framing is active",
                        id.label()
                    )));
                };
                match id {
                    ParamId::Zoom => *zoom = v,
                    ParamId::PanX => *pan_x = v,
                    _ => *pan_y = v,
                }
            }
            ParamId::Brightness => next.brightness = v as i32,
            ParamId::Contrast => next.contrast = v,
            ParamId::BlurLevel => next.blur_level = v as u32,
            ParamId::LowThreshold => next.thresholds.low = v as u8,
            ParamId::HighThreshold => next.thresholds.high = v as u8,
            ParamId::Speckle => next.tuning.speckle = v as u32,
            ParamId::OptTolerance => next.tuning.opt_tolerance = v,
            ParamId::AlphaMax => next.tuning.alpha_max = v,
        }
        next.validate()?;
        Ok(next)
    }

    /// Switch to crop framing.
    pub fn with_crop(&self, crop: CropSelection) -> Self {
        Self {
            framing: Framing::Crop(crop),
            ..self.clone()
        }
    }

    /// Drop any crop and return to zoom/pan framing with the given values.
    pub fn with_zoom_pan(&self, zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self {
            framing: Framing::ZoomPan { zoom, pan_x, pan_y },
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/params.rs"]
mod tests;
