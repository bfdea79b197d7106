//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::palette::PaletteOptions;
use crate::quantize::{DEFAULT_BUCKETS_PER_AXIS, MAX_BUCKETS_PER_AXIS};

/// Default scan slice, in pixels.
pub const DEFAULT_SLICE_PIXELS: usize = 100_000;

/// Settings fixed for the lifetime of an [`AnalysisEngine`](crate::AnalysisEngine).
///
/// Missing fields take their defaults when deserialized, so hosts can pass a
/// partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quantization cells per color axis (power of two, 1 to 64)
    pub buckets_per_axis: u32,
    /// Pixels processed between progress reports
    pub slice_pixels: usize,
    /// Palette reduction tuning
    pub palette: PaletteOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buckets_per_axis: DEFAULT_BUCKETS_PER_AXIS,
            slice_pixels: DEFAULT_SLICE_PIXELS,
            palette: PaletteOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Check the settings without building an engine.
    pub fn validate(&self) -> Result<()> {
        if !self.buckets_per_axis.is_power_of_two() || self.buckets_per_axis > MAX_BUCKETS_PER_AXIS {
            return Err(AnalysisError::InvalidBucketsPerAxis(self.buckets_per_axis));
        }
        if self.slice_pixels == 0 {
            return Err(AnalysisError::InvalidSliceSize);
        }
        Ok(())
    }
}
