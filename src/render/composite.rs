use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::foundation::core::{OutputSize, PixelRect};
use crate::params::ScaleMode;

/// Letterbox color for [`ScaleMode::Fit`]. Preview and export share it.
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

const RESAMPLE: FilterType = FilterType::Triangle;

/// Place `region` of `src` onto a canvas of exactly `size` pixels.
///
/// Returns `None` when the region does not lie inside `src`; the caller treats that like any
/// other degenerate geometry and skips the remaining stages.
pub fn composite(
    src: &RgbImage,
    region: PixelRect,
    size: OutputSize,
    mode: ScaleMode,
) -> Option<RgbImage> {
    if !region.fits_within(src.width(), src.height()) || size.width == 0 || size.height == 0 {
        return None;
    }
    let cropped = imageops::crop_imm(
        src,
        region.x0(),
        region.y0(),
        region.width(),
        region.height(),
    )
    .to_image();

    let (out_w, out_h) = (size.width, size.height);
    let out = match mode {
        ScaleMode::Stretch => imageops::resize(&cropped, out_w, out_h, RESAMPLE),
        ScaleMode::Fit => {
            let (w, h) = fit_size(cropped.width(), cropped.height(), out_w, out_h);
            let scaled = imageops::resize(&cropped, w, h, RESAMPLE);
            let mut canvas = RgbImage::from_pixel(out_w, out_h, BACKGROUND);
            imageops::replace(
                &mut canvas,
                &scaled,
                i64::from((out_w - w) / 2),
                i64::from((out_h - h) / 2),
            );
            canvas
        }
        ScaleMode::Fill => {
            let (w, h) = cover_size(cropped.width(), cropped.height(), out_w, out_h);
            let scaled = imageops::resize(&cropped, w, h, RESAMPLE);
            imageops::crop_imm(&scaled, (w - out_w) / 2, (h - out_h) / 2, out_w, out_h).to_image()
        }
    };
    debug_assert_eq!(out.dimensions(), (out_w, out_h));
    Some(out)
}

/// Largest `w x h` with the source aspect that fits inside the target (never larger).
fn fit_size(src_w: u32, src_h: u32, out_w: u32, out_h: u32) -> (u32, u32) {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (ow, oh) = (u64::from(out_w), u64::from(out_h));
    if ow * sh <= oh * sw {
        (out_w, ((sh * ow / sw) as u32).clamp(1, out_h))
    } else {
        (((sw * oh / sh) as u32).clamp(1, out_w), out_h)
    }
}

/// Smallest `w x h` with the source aspect that covers the target (never smaller).
fn cover_size(src_w: u32, src_h: u32, out_w: u32, out_h: u32) -> (u32, u32) {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (ow, oh) = (u64::from(out_w), u64::from(out_h));
    if ow * sh >= oh * sw {
        (out_w, (sh * ow).div_ceil(sw).max(oh) as u32)
    } else {
        ((sw * oh).div_ceil(sh).max(ow) as u32, out_h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
