//! Error types for the analysis engine.

use thiserror::Error;

/// Errors raised by engine construction, scanning and threshold validation.
///
/// Every variant is a deterministic function of its input; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The pixel buffer is not interleaved RGBA for the given dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidBufferLength { expected: usize, actual: usize },

    /// The image holds more pixels than a histogram bin can count.
    #[error("Image too large: {width}x{height} exceeds the histogram bin capacity")]
    ImageTooLarge { width: u32, height: u32 },

    /// A threshold level lies outside 0-255.
    #[error("Threshold level {value} is outside 0-255")]
    ThresholdOutOfRange { value: i32 },

    /// The shadow level is not strictly below the highlight level.
    #[error("Shadow level {shadow} must be below highlight level {highlight}")]
    ThresholdOrder { shadow: i32, highlight: i32 },

    /// Buckets per axis must be a power of two between 1 and 64.
    #[error("Buckets per axis must be a power of two between 1 and 64, got {0}")]
    InvalidBucketsPerAxis(u32),

    /// Scan slices must hold at least one pixel.
    #[error("Scan slice size must be at least one pixel")]
    InvalidSliceSize,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
