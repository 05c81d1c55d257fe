use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;
use image::{GrayImage, ImageFormat};

use crate::foundation::error::{LaserframeError, LaserframeResult};

/// Encode a mask as an uncompressed BMP byte stream (8-bit grayscale palette).
pub fn encode_bmp(mask: &GrayImage) -> LaserframeResult<Vec<u8>> {
    if mask.width() == 0 || mask.height() == 0 {
        return Err(LaserframeError::validation("cannot encode an empty bitmap"));
    }
    let mut buf = Cursor::new(Vec::with_capacity(
        mask.as_raw().len() + 54 + 256 * 4,
    ));
    mask.write_to(&mut buf, ImageFormat::Bmp)
        .context("failed to encode BMP")?;
    Ok(buf.into_inner())
}

/// Write [`encode_bmp`] output to `path`.
pub fn write_bmp(mask: &GrayImage, path: &Path) -> LaserframeResult<()> {
    let bytes = encode_bmp(mask)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write bitmap '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/vectorize/bitmap.rs"]
mod tests;
