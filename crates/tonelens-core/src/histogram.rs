//! Histogram computation from RGBA pixel data.
//!
//! This module provides the 256-bin luminance and per-channel frequency
//! tables used for the tone summary and the histogram display.

use crate::error::Result;
use crate::luminance::luminance_bin;
use crate::pixels::{validate_rgba, RGBA_CHANNELS};

/// Number of bins in every histogram table.
pub const BIN_COUNT: usize = 256;

/// Histogram data for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Red channel histogram (256 bins)
    pub red: [u32; BIN_COUNT],
    /// Green channel histogram (256 bins)
    pub green: [u32; BIN_COUNT],
    /// Blue channel histogram (256 bins)
    pub blue: [u32; BIN_COUNT],
    /// Luminance histogram (256 bins)
    pub luminance: [u32; BIN_COUNT],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            red: [0; BIN_COUNT],
            green: [0; BIN_COUNT],
            blue: [0; BIN_COUNT],
            luminance: [0; BIN_COUNT],
        }
    }
}

impl Histogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pixels counted, taken from the luminance table.
    pub fn total(&self) -> u64 {
        self.luminance.iter().map(|&v| v as u64).sum()
    }

    /// Whether no pixel has been counted. An empty histogram means "no data",
    /// not "all pixels are black".
    pub fn is_empty(&self) -> bool {
        self.luminance.iter().all(|&v| v == 0)
    }

    /// Find the maximum value across all RGB channels for normalization
    pub fn max_value(&self) -> u32 {
        let max_r = *self.red.iter().max().unwrap_or(&0);
        let max_g = *self.green.iter().max().unwrap_or(&0);
        let max_b = *self.blue.iter().max().unwrap_or(&0);
        max_r.max(max_g).max(max_b)
    }

    /// Largest luminance bin, used to scale the luminance display.
    pub fn max_luminance(&self) -> u32 {
        *self.luminance.iter().max().unwrap_or(&0)
    }

    /// Check for highlight clipping (values at 255)
    pub fn has_highlight_clipping(&self) -> bool {
        self.red[255] > 0 || self.green[255] > 0 || self.blue[255] > 0
    }

    /// Check for shadow clipping (values at 0)
    pub fn has_shadow_clipping(&self) -> bool {
        self.red[0] > 0 || self.green[0] > 0 || self.blue[0] > 0
    }
}

/// Streaming accumulator behind [`Histogram`].
///
/// Accumulation is commutative: the finished tables do not depend on the
/// order in which pixels arrive.
#[derive(Debug, Clone, Default)]
pub struct HistogramAccumulator {
    hist: Histogram,
}

impl HistogramAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every bin.
    pub fn reset(&mut self) {
        self.hist.red.fill(0);
        self.hist.green.fill(0);
        self.hist.blue.fill(0);
        self.hist.luminance.fill(0);
    }

    /// Count one pixel.
    #[inline]
    pub fn accumulate(&mut self, r: u8, g: u8, b: u8) {
        self.hist.red[r as usize] += 1;
        self.hist.green[g as usize] += 1;
        self.hist.blue[b as usize] += 1;
        self.hist.luminance[luminance_bin(r, g, b) as usize] += 1;
    }

    /// Count every pixel of an interleaved RGBA slice. Alpha is ignored and a
    /// trailing partial pixel is skipped; callers validate lengths first.
    pub fn accumulate_rgba(&mut self, samples: &[u8]) {
        for px in samples.chunks_exact(RGBA_CHANNELS) {
            self.accumulate(px[0], px[1], px[2]);
        }
    }

    /// The tables accumulated so far.
    pub fn histogram(&self) -> &Histogram {
        &self.hist
    }

    pub fn into_histogram(self) -> Histogram {
        self.hist
    }
}

/// Compute RGB and luminance histograms from RGBA pixel data in one pass.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
/// Returns an error if the buffer length does not match `width * height * 4`.
pub fn compute_histogram(pixels: &[u8], width: u32, height: u32) -> Result<Histogram> {
    validate_rgba(pixels, width, height)?;

    let mut acc = HistogramAccumulator::new();
    acc.accumulate_rgba(pixels);
    Ok(acc.into_histogram())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
