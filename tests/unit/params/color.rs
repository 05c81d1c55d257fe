use super::*;
use serde_json::json;

#[test]
fn parses_hex_with_and_without_hash() {
    assert_eq!(
        StrokeColor::parse_hex("#FF8000").unwrap(),
        StrokeColor::rgb(255, 128, 0)
    );
    assert_eq!(
        StrokeColor::parse_hex("00ff00").unwrap(),
        StrokeColor::rgb(0, 255, 0)
    );
}

#[test]
fn rejects_short_long_and_non_hex() {
    assert!(StrokeColor::parse_hex("#fff").is_err());
    assert!(StrokeColor::parse_hex("#ff000080").is_err());
    assert!(StrokeColor::parse_hex("#gg0000").is_err());
    assert!(StrokeColor::parse_hex("#ééé").is_err());
    assert!(StrokeColor::parse_hex("#+f+f+f").is_err());
    assert!(StrokeColor::parse_hex("+fffff").is_err());
}

#[test]
fn serializes_as_lowercase_hex_string() {
    let c = StrokeColor::rgb(0xAB, 0x01, 0xFF);
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#ab01ff"));
    let back: StrokeColor = serde_json::from_value(json!("#AB01FF")).unwrap();
    assert_eq!(back, c);
    assert!(serde_json::from_value::<StrokeColor>(json!("red")).is_err());
}
