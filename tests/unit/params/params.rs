use super::*;
use crate::foundation::core::Point;
use crate::geometry::DisplayLayout;

#[test]
fn defaults_match_the_interactive_tool() {
    let p = ParameterSet::default();
    assert!(p.square_aspect);
    assert_eq!(p.scale_mode, ScaleMode::Fill);
    assert_eq!(p.thresholds, EdgeThresholds { low: 50, high: 150 });
    assert_eq!(p.tuning.speckle, 2);
    assert_eq!(p.stroke.to_hex(), "#000000");
    p.validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let p = ParameterSet::from_json_str(
        r##"{ "scale_mode": "fit", "thresholds": { "low": 10, "high": 20 }, "stroke": "#00FF00" }"##,
    )
    .unwrap();
    assert_eq!(p.scale_mode, ScaleMode::Fit);
    assert_eq!(p.thresholds.low, 10);
    assert_eq!(p.stroke, StrokeColor::rgb(0, 255, 0));
    assert_eq!(p.contrast, 1.0);
}

#[test]
fn json_rejects_unknown_fields_and_bad_invariants() {
    assert!(ParameterSet::from_json_str(r##"{ "colour": "#000000" }"##).is_err());
    assert!(
        ParameterSet::from_json_str(r#"{ "thresholds": { "low": 200, "high": 100 } }"#).is_err()
    );
    assert!(
        ParameterSet::from_json_str(
            r#"{ "framing": { "mode": "zoom_pan", "zoom": 0.5, "pan_x": 0, "pan_y": 0 } }"#
        )
        .is_err()
    );
}

#[test]
fn json_round_trip_preserves_crop_framing() {
    let layout = DisplayLayout::fit(1920, 1080, 640, 480);
    let p = ParameterSet::default().with_crop(CropSelection::new(
        Point::new(1.0, 2.0),
        Point::new(30.0, 40.0),
        layout,
    ));
    let text = p.to_json_pretty().unwrap();
    assert!(text.contains("\"mode\": \"crop\""));
    assert_eq!(ParameterSet::from_json_str(&text).unwrap(), p);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut p = ParameterSet::default();
    p.tuning.alpha_max = 2.0;
    assert!(p.validate().is_err());

    let mut p = ParameterSet::default();
    p.framing = Framing::ZoomPan {
        zoom: 1.0,
        pan_x: 1.5,
        pan_y: 0.0,
    };
    assert!(p.validate().is_err());

    let mut p = ParameterSet::default();
    p.output_size = OutputSize {
        width: 0,
        height: 10,
    };
    assert!(p.validate().is_err());
}

#[test]
fn with_value_rounds_integer_params_and_leaves_original_untouched() {
    let base = ParameterSet::default();
    let next = base.with_value(ParamId::BlurLevel, 2.7).unwrap();
    assert_eq!(next.blur_level, 3);
    assert_eq!(base.blur_level, 0);
    assert_eq!(next.value(ParamId::BlurLevel), 3.0);
}

#[test]
fn zoom_pan_is_disabled_under_crop() {
    let layout = DisplayLayout::fit(100, 100, 100, 100);
    let cropped = ParameterSet::default().with_crop(CropSelection::new(
        Point::new(0.0, 0.0),
        Point::new(50.0, 50.0),
        layout,
    ));
    assert!(cropped.with_value(ParamId::Zoom, 2.0).is_err());
    assert_eq!(cropped.value(ParamId::Zoom), 1.0);

    let back = cropped.with_zoom_pan(2.0, 0.5, 0.0);
    assert_eq!(back.value(ParamId::Zoom), 2.0);
    assert_eq!(back.value(ParamId::PanX), 0.5);
}

#[test]
fn threshold_edit_cannot_cross() {
    let p = ParameterSet::default();
    assert!(p.with_value(ParamId::LowThreshold, 200.0).is_err());
    assert!(p.with_value(ParamId::HighThreshold, 50.0).is_ok());
}
