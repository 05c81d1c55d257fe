use super::*;

#[test]
fn frame_90_at_30fps_is_three_seconds() {
    assert_eq!(format_timecode(FrameIndex(90), 30.0), "00:00:03:00");
    assert_eq!(parse_timecode("00:00:03:00", 30.0).unwrap(), FrameIndex(90));
}

#[test]
fn formats_hours_minutes_and_frame_remainder() {
    // 1h 2m 3s + 4 frames at 25 fps.
    let frame = (3600 + 120 + 3) * 25 + 4;
    assert_eq!(format_timecode(FrameIndex(frame), 25.0), "01:02:03:04");
    assert_eq!(
        parse_timecode("01:02:03:04", 25.0).unwrap(),
        FrameIndex(frame)
    );
}

#[test]
fn zero_fps_formats_as_zero() {
    assert_eq!(format_timecode(FrameIndex(1234), 0.0), "00:00:00:00");
    assert!(parse_timecode("00:00:01:00", 0.0).is_err());
}

#[test]
fn rejects_malformed_timecodes() {
    for bad in [
        "",
        "00:00:03",
        "00:00:03:00:00",
        "aa:00:03:00",
        "00:-1:03:00",
        "00:60:00:00",
        "00:00:60:00",
        "00:00:01:30",
        "00::01:00",
    ] {
        assert!(parse_timecode(bad, 30.0).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn fractional_fps_round_trips_whole_seconds() {
    let fps = 30000.0 / 1001.0;
    let parsed = parse_timecode("00:01:00:00", fps).unwrap();
    assert_eq!(parsed, FrameIndex(1798));
    assert!(parse_timecode("00:00:00:29", fps).is_ok());
}
