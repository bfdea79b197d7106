//! Tonelens Core - tonal and color analysis engine
//!
//! This crate turns decoded RGBA pixel data into a tonal profile: luminance
//! and per-channel histograms, a small palette of dominant colors, and a
//! high-key / low-key / neutral classification driven by two threshold levels.
//!
//! # Module Structure
//!
//! - `histogram` - 256-bin luminance and RGB histograms
//! - `quantize` - coarse RGB bucket grid with per-bucket sums
//! - `palette` - greedy merge of buckets into dominant colors
//! - `tone` - thresholds, zone statistics and key classification
//! - `scan` - the engine and its chunked, resumable scan driver
//!
//! Decoding, downscaling and all rendering belong to the host.

pub mod config;
pub mod error;
pub mod histogram;
pub mod luminance;
pub mod palette;
pub mod pixels;
pub mod quantize;
pub mod scan;
pub mod tone;

pub use config::EngineConfig;
pub use error::{AnalysisError, Result};
pub use histogram::{compute_histogram, Histogram, HistogramAccumulator};
pub use palette::{reduce, reduce_with, PaletteEntry, PaletteOptions};
pub use quantize::{BucketTable, ColorBucket, ColorQuantizer};
pub use scan::{AnalysisEngine, ScanProgress, ScanResult, ScanSession, SliceCursor};
pub use tone::{summarize, ThresholdHandle, ToneKey, ToneSummary, ToneThresholds, ToneZone};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_snapshots_are_shareable() {
        assert_send_sync::<Histogram>();
        assert_send_sync::<BucketTable>();
        assert_send_sync::<ScanResult>();
        assert_send_sync::<AnalysisEngine>();
    }

    #[test]
    fn test_end_to_end_profile() {
        // half dark blue, half bright sand
        let mut pixels = [20u8, 30, 90, 255].repeat(50);
        pixels.extend([230u8, 210, 170, 255].repeat(50));

        let mut engine = AnalysisEngine::default();
        let result = engine.scan(&pixels, 10, 10, |_| {}).unwrap();

        assert_eq!(result.palette.len(), 2);
        assert_eq!(result.palette[0].hex(), "#141E5A");
        assert_eq!(result.palette[1].hex(), "#E6D2AA");
        assert!((result.palette[0].share(100) - 0.5).abs() < 1e-12);

        let summary = result.summarize(&ToneThresholds::default());
        assert_eq!(summary.shadow_proportion, 0.5);
        assert_eq!(summary.highlight_proportion, 0.5);
        assert_eq!(summary.key, ToneKey::Neutral);
    }
}
