use super::*;

fn request(root: &str, name: &str) -> ExportRequest {
    ExportRequest {
        params: ParameterSet::default(),
        range: TimelineRange::new(FrameIndex(10), FrameIndex(12), 100).unwrap(),
        output_root: PathBuf::from(root),
        folder_name: name.to_string(),
    }
}

#[test]
fn documents_are_five_digit_one_based() {
    assert_eq!(document_name(1), "00001.svg");
    assert_eq!(document_name(42), "00042.svg");
    assert_eq!(document_name(123456), "123456.svg");
}

#[test]
fn request_validation_rejects_bad_input() {
    let tmp = std::env::temp_dir();
    let root = tmp.to_string_lossy().into_owned();
    assert!(request(&root, "clip").validate(100).is_ok());
    assert_eq!(request(&root, " clip ").folder(), tmp.join("clip"));

    for bad in ["", "  ", "..", "a/b", "a\\b"] {
        assert!(request(&root, bad).validate(100).is_err(), "{bad:?}");
    }
    assert!(request("", "clip").validate(100).is_err());
    // Range ends past the video.
    assert!(request(&root, "clip").validate(12).is_err());

    let mut req = request(&root, "clip");
    req.params.thresholds.low = 200;
    req.params.thresholds.high = 100;
    assert!(matches!(
        req.validate(100),
        Err(LaserframeError::Validation(_))
    ));
}

#[test]
fn progress_fraction() {
    let ev = ExportEvent::Progress { done: 1, total: 4 };
    assert_eq!(ev.fraction(), Some(0.25));
    assert_eq!(ExportEvent::Failed("x".into()).fraction(), None);
    assert_eq!(ExportEvent::Progress { done: 0, total: 0 }.fraction(), None);
}

#[test]
fn controller_starts_idle() {
    let c = ExportController::new();
    assert!(!c.is_running());
}
