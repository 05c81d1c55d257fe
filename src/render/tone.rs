use image::RgbImage;
use rayon::prelude::*;

const CHANNELS: usize = 3;

/// Brightness/contrast remap followed by a separable Gaussian pre-blur.
///
/// `out = saturate(in * contrast + brightness)` per channel. The blur kernel is
/// `2 * blur_level + 1` taps wide; level 0 leaves the image unblurred.
pub fn apply_tone(src: &RgbImage, brightness: i32, contrast: f64, blur_level: u32) -> RgbImage {
    let lut = tone_lut(brightness, contrast);
    let mut out = src.clone();
    if out.is_empty() {
        return out;
    }
    let row_len = out.width() as usize * CHANNELS;
    out.par_chunks_mut(row_len).for_each(|row| {
        for c in row {
            *c = lut[usize::from(*c)];
        }
    });

    if blur_level == 0 {
        return out;
    }
    gaussian_blur(&out, blur_level)
}

fn tone_lut(brightness: i32, contrast: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        let mapped = (i as f64) * contrast + f64::from(brightness);
        *v = mapped.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Kernel size `2 * level + 1`, sigma derived from the size the way OpenCV does for `sigma = 0`.
pub fn kernel_sigma(level: u32) -> f32 {
    let ksize = 2.0 * level as f32 + 1.0;
    0.3 * ((ksize - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_blur(src: &RgbImage, level: u32) -> RgbImage {
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return src.clone();
    }
    let kernel = gaussian_kernel_q16(level, kernel_sigma(level));
    let row_len = width as usize * CHANNELS;

    let mut tmp = vec![0u8; src.as_raw().len()];
    tmp.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| horizontal_row(src.as_raw(), row, y, width, &kernel));

    let mut out = vec![0u8; tmp.len()];
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| vertical_row(&tmp, row, y, width, height, &kernel));

    RgbImage::from_raw(width, height, out).unwrap_or_else(|| src.clone())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    let r = radius as i32;
    let sigma = f64::from(sigma.max(f32::EPSILON));
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|&wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Push the rounding residue into the center tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    weights
}

fn horizontal_row(src: &[u8], dst: &mut [u8], y: usize, width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row = y * width as usize * CHANNELS;
    for x in 0..w {
        let mut acc = [0u64; CHANNELS];
        for (ki, &kw) in k.iter().enumerate() {
            let sx = (x + ki as i32 - radius).clamp(0, w - 1);
            let idx = row + sx as usize * CHANNELS;
            for c in 0..CHANNELS {
                acc[c] += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        let out = x as usize * CHANNELS;
        for c in 0..CHANNELS {
            dst[out + c] = q16_to_u8(acc[c]);
        }
    }
}

fn vertical_row(src: &[u8], dst: &mut [u8], y: usize, width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let h = height as i32;
    let row_len = width as usize * CHANNELS;
    for x in 0..width as usize {
        let mut acc = [0u64; CHANNELS];
        for (ki, &kw) in k.iter().enumerate() {
            let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
            let idx = sy as usize * row_len + x * CHANNELS;
            for c in 0..CHANNELS {
                acc[c] += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        for c in 0..CHANNELS {
            dst[x * CHANNELS + c] = q16_to_u8(acc[c]);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/tone.rs"]
mod tests;
