//! Chunked scan driver.
//!
//! A scan walks the RGBA buffer in fixed-size slices, feeding every pixel to
//! the histogram accumulator and the color quantizer. The slice boundary is
//! the only suspension point: [`ScanSession::step`] processes exactly one
//! slice and hands control back, so a host can return to its event loop
//! between slices. [`AnalysisEngine::scan`] is the synchronous driver that
//! steps to completion and reports progress after each slice.
//!
//! There is no cancellation. Dropping a session mid-scan leaves the engine
//! holding partial tables; the next scan resets them.

use std::ops::Range;

use log::{debug, trace};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::{AnalysisError, Result};
use crate::histogram::{Histogram, HistogramAccumulator};
use crate::palette::{reduce_with, PaletteEntry};
use crate::pixels::{validate_rgba, RGBA_CHANNELS};
use crate::quantize::{BucketTable, ColorQuantizer};
use crate::tone::{summarize, ToneSummary, ToneThresholds};

/// Stage note attached to scan progress.
pub const SCAN_NOTE: &str = "Computing histogram…";

/// Progress after one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanProgress {
    /// `slices_done / slices_total`, ending at exactly 1.0
    pub fraction: f64,
    pub slices_done: usize,
    pub slices_total: usize,
    /// Human-readable stage description
    pub note: &'static str,
}

/// Position of a scan within a buffer of known length.
///
/// A zero-length buffer still counts as one (empty) slice so that progress
/// always finishes at 1.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceCursor {
    offset: usize,
    byte_len: usize,
    slice_bytes: usize,
    slices_done: usize,
    slices_total: usize,
}

impl SliceCursor {
    /// Cursor over `byte_len` RGBA bytes cut into slices of `slice_pixels`.
    pub fn new(byte_len: usize, slice_pixels: usize) -> Self {
        let slice_bytes = slice_pixels.max(1).saturating_mul(RGBA_CHANNELS);
        let slices_total = byte_len.div_ceil(slice_bytes).max(1);
        Self {
            offset: 0,
            byte_len,
            slice_bytes,
            slices_done: 0,
            slices_total,
        }
    }

    pub fn slices_done(&self) -> usize {
        self.slices_done
    }

    pub fn slices_total(&self) -> usize {
        self.slices_total
    }

    pub fn is_done(&self) -> bool {
        self.slices_done >= self.slices_total
    }

    pub fn fraction(&self) -> f64 {
        self.slices_done as f64 / self.slices_total as f64
    }

    fn next_range(&mut self) -> Option<Range<usize>> {
        if self.is_done() {
            return None;
        }
        let end = (self.offset + self.slice_bytes).min(self.byte_len);
        let range = self.offset..end;
        self.offset = end;
        self.slices_done += 1;
        Some(range)
    }

    fn progress(&self) -> ScanProgress {
        ScanProgress {
            fraction: self.fraction(),
            slices_done: self.slices_done,
            slices_total: self.slices_total,
            note: SCAN_NOTE,
        }
    }
}

/// Consolidated output of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub histogram: Histogram,
    pub buckets: BucketTable,
    pub palette: Vec<PaletteEntry>,
    pub total_pixels: u32,
}

impl ScanResult {
    /// Tone statistics for this scan; cheap enough to call on every threshold change.
    pub fn summarize(&self, thresholds: &ToneThresholds) -> ToneSummary {
        summarize(&self.histogram.luminance, self.total_pixels as u64, thresholds)
    }
}

/// Owner of all per-image accumulation state.
///
/// Histogram and bucket storage is allocated once here and reset at the start
/// of every scan, so nothing carries over between images.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: EngineConfig,
    histogram: HistogramAccumulator,
    quantizer: ColorQuantizer,
    total_pixels: u32,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            histogram: HistogramAccumulator::new(),
            quantizer: ColorQuantizer::default(),
            total_pixels: 0,
        }
    }
}

impl AnalysisEngine {
    /// Build an engine.
    ///
    /// # Errors
    /// Fails if `config` does not validate; an engine is never built from a
    /// bad configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let quantizer = ColorQuantizer::new(config.buckets_per_axis)?;
        Ok(Self {
            config,
            histogram: HistogramAccumulator::new(),
            quantizer,
            total_pixels: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Histograms from the most recent scan.
    pub fn histogram(&self) -> &Histogram {
        self.histogram.histogram()
    }

    /// Bucket table from the most recent scan.
    pub fn buckets(&self) -> &BucketTable {
        self.quantizer.table()
    }

    /// Pixel count claimed by the most recent scan.
    pub fn total_pixels(&self) -> u32 {
        self.total_pixels
    }

    /// Dominant colors of the most recent scan, derived fresh on every call.
    pub fn palette(&self) -> Vec<PaletteEntry> {
        reduce_with(self.quantizer.table(), &self.config.palette)
    }

    /// Tone statistics of the most recent scan.
    pub fn summarize(&self, thresholds: &ToneThresholds) -> ToneSummary {
        summarize(
            &self.histogram.histogram().luminance,
            self.total_pixels as u64,
            thresholds,
        )
    }

    /// Validate the buffer, reset all tables and return a cursor for stepping
    /// through it with [`scan_slice`](Self::scan_slice).
    ///
    /// On error nothing is reset.
    pub fn prepare(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<SliceCursor> {
        let total = validate_rgba(pixels, width, height)?;

        self.histogram.reset();
        self.quantizer.reset();
        self.total_pixels = total;

        let cursor = SliceCursor::new(pixels.len(), self.config.slice_pixels);
        debug!(
            "scan: {}x{} ({} pixels) in {} slices",
            width,
            height,
            total,
            cursor.slices_total()
        );
        Ok(cursor)
    }

    /// Process the next slice of `pixels`, which must be the buffer the
    /// cursor was prepared for. Returns `None` once the cursor is exhausted.
    pub fn scan_slice(
        &mut self,
        pixels: &[u8],
        cursor: &mut SliceCursor,
    ) -> Result<Option<ScanProgress>> {
        if pixels.len() != cursor.byte_len {
            return Err(AnalysisError::InvalidBufferLength {
                expected: cursor.byte_len,
                actual: pixels.len(),
            });
        }
        Ok(self.advance(pixels, cursor))
    }

    fn advance(&mut self, pixels: &[u8], cursor: &mut SliceCursor) -> Option<ScanProgress> {
        let range = cursor.next_range()?;
        let slice = &pixels[range];
        for px in slice.chunks_exact(RGBA_CHANNELS) {
            self.histogram.accumulate(px[0], px[1], px[2]);
            self.quantizer.accumulate(px[0], px[1], px[2]);
        }

        let progress = cursor.progress();
        trace!(
            "scan: slice {}/{} done",
            progress.slices_done,
            progress.slices_total
        );
        Some(progress)
    }

    /// Start a resumable scan over `pixels`.
    pub fn begin_scan<'a>(
        &'a mut self,
        pixels: &'a [u8],
        width: u32,
        height: u32,
    ) -> Result<ScanSession<'a>> {
        let cursor = self.prepare(pixels, width, height)?;
        Ok(ScanSession {
            engine: self,
            pixels,
            cursor,
        })
    }

    /// Scan `pixels` to completion, calling `on_progress` after every slice.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidBufferLength`] if the buffer is not
    /// `width * height * 4` bytes.
    pub fn scan<F>(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        mut on_progress: F,
    ) -> Result<ScanResult>
    where
        F: FnMut(&ScanProgress),
    {
        let mut session = self.begin_scan(pixels, width, height)?;
        while let Some(progress) = session.step() {
            on_progress(&progress);
        }
        Ok(session.finish())
    }

    /// Run the palette reducer and package the current tables.
    pub fn result(&self) -> ScanResult {
        let palette = self.palette();
        debug!(
            "scan: finished {} pixels, {} active buckets, {} palette entries",
            self.total_pixels,
            self.quantizer.table().active_len(),
            palette.len()
        );
        ScanResult {
            histogram: self.histogram.histogram().clone(),
            buckets: self.quantizer.table().clone(),
            palette,
            total_pixels: self.total_pixels,
        }
    }
}

/// A scan in progress, borrowing the engine and the pixel buffer.
#[derive(Debug)]
pub struct ScanSession<'a> {
    engine: &'a mut AnalysisEngine,
    pixels: &'a [u8],
    cursor: SliceCursor,
}

impl ScanSession<'_> {
    /// Process one slice. `None` once every slice has been processed.
    pub fn step(&mut self) -> Option<ScanProgress> {
        self.engine.advance(self.pixels, &mut self.cursor)
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_done()
    }

    /// Fraction of slices processed so far.
    pub fn fraction(&self) -> f64 {
        self.cursor.fraction()
    }

    /// Process any remaining slices and return the consolidated result.
    pub fn finish(mut self) -> ScanResult {
        while self.step().is_some() {}
        self.engine.result()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
