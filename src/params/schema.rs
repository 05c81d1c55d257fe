use serde::{Deserialize, Serialize};

/// Whether a slider parameter holds whole numbers or a continuous value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Integer,
    Continuous,
}

/// Every slider-driven parameter, with a fixed kind and range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    Zoom,
    PanX,
    PanY,
    Brightness,
    Contrast,
    BlurLevel,
    LowThreshold,
    HighThreshold,
    Speckle,
    OptTolerance,
    AlphaMax,
}

impl ParamId {
    pub const ALL: [ParamId; 11] = [
        ParamId::Zoom,
        ParamId::PanX,
        ParamId::PanY,
        ParamId::Brightness,
        ParamId::Contrast,
        ParamId::BlurLevel,
        ParamId::LowThreshold,
        ParamId::HighThreshold,
        ParamId::Speckle,
        ParamId::OptTolerance,
        ParamId::AlphaMax,
    ];

    pub fn kind(self) -> NumericKind {
        match self {
            ParamId::Zoom
            | ParamId::PanX
            | ParamId::PanY
            | ParamId::Contrast
            | ParamId::OptTolerance
            | ParamId::AlphaMax => NumericKind::Continuous,
            ParamId::Brightness
            | ParamId::BlurLevel
            | ParamId::LowThreshold
            | ParamId::HighThreshold
            | ParamId::Speckle => NumericKind::Integer,
        }
    }

    /// Inclusive `(min, max)` slider range.
    pub fn range(self) -> (f64, f64) {
        match self {
            ParamId::Zoom => (1.0, 4.0),
            ParamId::PanX | ParamId::PanY => (-1.0, 1.0),
            ParamId::Brightness => (-100.0, 100.0),
            ParamId::Contrast => (0.1, 3.0),
            ParamId::BlurLevel => (0.0, 25.0),
            ParamId::LowThreshold | ParamId::HighThreshold => (0.0, 255.0),
            ParamId::Speckle => (0.0, 50.0),
            ParamId::OptTolerance => (0.0, 5.0),
            ParamId::AlphaMax => (0.0, 1.334),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamId::Zoom => "zoom",
            ParamId::PanX => "pan x",
            ParamId::PanY => "pan y",
            ParamId::Brightness => "brightness",
            ParamId::Contrast => "contrast",
            ParamId::BlurLevel => "pre-blur",
            ParamId::LowThreshold => "low threshold",
            ParamId::HighThreshold => "high threshold",
            ParamId::Speckle => "speckle removal",
            ParamId::OptTolerance => "curve smoothing",
            ParamId::AlphaMax => "corner smoothing",
        }
    }

    /// Clamp into range; integer kinds are rounded to the nearest whole number.
    pub fn normalize(self, value: f64) -> f64 {
        let (min, max) = self.range();
        let v = value.clamp(min, max);
        match self.kind() {
            NumericKind::Integer => v.round(),
            NumericKind::Continuous => v,
        }
    }

    /// Text shown next to the slider.
    pub fn format_value(self, value: f64) -> String {
        match self.kind() {
            NumericKind::Integer => format!("{}", value.round() as i64),
            NumericKind::Continuous => format!("{value:.2}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/schema.rs"]
mod tests;
