//! Pixel buffer validation.

use crate::error::{AnalysisError, Result};

/// Samples per pixel in an interleaved RGBA buffer.
pub const RGBA_CHANNELS: usize = 4;

/// Check that `pixels` is exactly `width * height` RGBA pixels and return the
/// pixel count.
///
/// A zero-area image with an empty buffer is valid and yields 0.
pub fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<u32> {
    let total = width as u64 * height as u64;
    if total > u32::MAX as u64 {
        return Err(AnalysisError::ImageTooLarge { width, height });
    }

    let expected = usize::try_from(total)
        .ok()
        .and_then(|n| n.checked_mul(RGBA_CHANNELS))
        .ok_or(AnalysisError::ImageTooLarge { width, height })?;
    if pixels.len() != expected {
        return Err(AnalysisError::InvalidBufferLength {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(total as u32)
}
