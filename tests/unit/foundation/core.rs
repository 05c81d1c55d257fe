use super::*;

#[test]
fn zero_area_rects_are_rejected() {
    assert!(PixelRect::from_corners(5, 5, 5, 10).is_none());
    assert!(PixelRect::from_corners(5, 5, 10, 5).is_none());
    assert!(PixelRect::from_corners(10, 5, 5, 10).is_none());
    assert!(PixelRect::full(0, 10).is_none());
}

#[test]
fn square_of_wide_rect_is_centered_horizontally() {
    let r = PixelRect::from_origin_size(0, 0, 400, 200).unwrap();
    let sq = r.centered_square();
    assert_eq!((sq.x0(), sq.y0(), sq.width(), sq.height()), (100, 0, 200, 200));
}

#[test]
fn square_of_tall_rect_keeps_origin_offset() {
    let r = PixelRect::from_origin_size(10, 20, 30, 91).unwrap();
    let sq = r.centered_square();
    assert_eq!((sq.x0(), sq.y0(), sq.width(), sq.height()), (10, 50, 30, 30));
}

#[test]
fn output_size_rejects_zero() {
    assert!(OutputSize::new(0, 10).is_err());
    assert!(OutputSize::square(0).is_err());
    assert_eq!(OutputSize::square(8).unwrap(), OutputSize { width: 8, height: 8 });
}
