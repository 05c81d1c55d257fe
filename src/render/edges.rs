use image::{GrayImage, Luma, RgbImage};

use crate::params::EdgeThresholds;

/// Value of an edge pixel in a mask; everything else is 0.
pub const EDGE: u8 = 255;

/// Canny edge mask of a toned image (white edges on black).
pub fn detect_edges(img: &RgbImage, thresholds: EdgeThresholds) -> GrayImage {
    let gray = image::imageops::grayscale(img);
    detect_edges_gray(&gray, thresholds)
}

fn detect_edges_gray(gray: &GrayImage, thresholds: EdgeThresholds) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    // Canny requires low <= high.
    let (low, high) = if thresholds.low <= thresholds.high {
        (thresholds.low, thresholds.high)
    } else {
        (thresholds.high, thresholds.low)
    };
    imageproc::edges::canny(gray, f32::from(low), f32::from(high))
}

/// Edge extraction for one pass.
///
/// With `centerline` set, the first mask is thinned to a one-pixel skeleton and the detector
/// runs again on the skeleton.
pub fn extract_edges(img: &RgbImage, thresholds: EdgeThresholds, centerline: bool) -> GrayImage {
    let edges = detect_edges(img, thresholds);
    if !centerline {
        return edges;
    }
    let skeleton = thin(&edges);
    detect_edges_gray(&skeleton, thresholds)
}

/// Swap foreground and background so edges become dark-on-light for tracing.
pub fn invert(mask: &GrayImage) -> GrayImage {
    let mut out = mask.clone();
    image::imageops::invert(&mut out);
    out
}

/// Zhang-Suen thinning. Non-zero pixels are foreground; output is a 0/255 skeleton.
pub fn thin(mask: &GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut px: Vec<u8> = mask.as_raw().iter().map(|&v| u8::from(v != 0)).collect();
    if w < 3 || h < 3 {
        return to_mask(mask.width(), mask.height(), &px);
    }

    let mut marked = Vec::new();
    loop {
        let mut changed = false;
        for step in 0..2 {
            marked.clear();
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    if px[y * w + x] == 0 {
                        continue;
                    }
                    // P2..P9 clockwise from north.
                    let n = [
                        px[(y - 1) * w + x],
                        px[(y - 1) * w + x + 1],
                        px[y * w + x + 1],
                        px[(y + 1) * w + x + 1],
                        px[(y + 1) * w + x],
                        px[(y + 1) * w + x - 1],
                        px[y * w + x - 1],
                        px[(y - 1) * w + x - 1],
                    ];
                    let b: u8 = n.iter().sum();
                    if !(2..=6).contains(&b) {
                        continue;
                    }
                    let a = (0..8).filter(|&i| n[i] == 0 && n[(i + 1) % 8] == 1).count();
                    if a != 1 {
                        continue;
                    }
                    let (p2, p4, p6, p8) = (n[0], n[2], n[4], n[6]);
                    let keep = if step == 0 {
                        p2 * p4 * p6 != 0 || p4 * p6 * p8 != 0
                    } else {
                        p2 * p4 * p8 != 0 || p2 * p6 * p8 != 0
                    };
                    if !keep {
                        marked.push(y * w + x);
                    }
                }
            }
            for &i in &marked {
                px[i] = 0;
            }
            changed |= !marked.is_empty();
        }
        if !changed {
            break;
        }
    }
    to_mask(mask.width(), mask.height(), &px)
}

fn to_mask(width: u32, height: u32, bits: &[u8]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let i = y as usize * width as usize + x as usize;
        Luma([if bits[i] != 0 { EDGE } else { 0 }])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/edges.rs"]
mod tests;
