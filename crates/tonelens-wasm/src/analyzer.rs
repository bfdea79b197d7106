//! Analysis engine WASM bindings.
//!
//! `JsAnalyzer` owns one engine. A scan can run in two ways:
//!
//! - `scan` processes the whole buffer in one call, invoking an optional
//!   progress callback after every slice.
//! - `begin` / `step` / `finish` process one slice per `step` call, so the
//!   host can `await` between slices and keep the page responsive.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const analyzer = new JsAnalyzer({ slice_pixels: 100_000 });
//! analyzer.begin(imageData.data, w, h);
//! let fraction;
//! while ((fraction = analyzer.step()) !== undefined) {
//!   setBusyProgress(fraction, analyzer.note);
//!   await new Promise(r => setTimeout(r, 0));
//! }
//! analyzer.finish();
//!
//! const palette = analyzer.palette();
//! const summary = analyzer.summarize(thresholds);
//! ```

use tonelens_core::palette::PaletteEntry;
use tonelens_core::scan::{AnalysisEngine, SliceCursor, SCAN_NOTE};
use tonelens_core::EngineConfig;
use wasm_bindgen::prelude::*;

use crate::histogram::JsHistogram;
use crate::tone::{JsThresholds, JsToneSummary};

/// A dominant color for swatch rendering.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsPaletteEntry {
    inner: PaletteEntry,
}

#[wasm_bindgen]
impl JsPaletteEntry {
    #[wasm_bindgen(getter)]
    pub fn r(&self) -> u8 {
        self.inner.r
    }

    #[wasm_bindgen(getter)]
    pub fn g(&self) -> u8 {
        self.inner.g
    }

    #[wasm_bindgen(getter)]
    pub fn b(&self) -> u8 {
        self.inner.b
    }

    /// Pixels belonging to this color.
    #[wasm_bindgen(getter)]
    pub fn count(&self) -> u32 {
        self.inner.count as u32
    }

    /// `#RRGGBB` label.
    pub fn hex(&self) -> String {
        self.inner.hex()
    }

    /// Fraction of `total_pixels` covered by this color.
    pub fn share(&self, total_pixels: u32) -> f64 {
        self.inner.share(total_pixels as u64)
    }
}

/// Buffer copied into WASM memory for a stepped scan.
struct PendingScan {
    pixels: Vec<u8>,
    cursor: SliceCursor,
}

/// Tonal and color analyzer for one image at a time.
#[wasm_bindgen]
pub struct JsAnalyzer {
    engine: AnalysisEngine,
    pending: Option<PendingScan>,
}

#[wasm_bindgen]
impl JsAnalyzer {
    /// Create an analyzer.
    ///
    /// # Arguments
    /// * `config` - Optional `{ buckets_per_axis, slice_pixels, palette }`
    ///   object; missing fields take their defaults
    ///
    /// # Errors
    /// Returns an error if the configuration is malformed or invalid (for
    /// example `buckets_per_axis` not a power of two).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsAnalyzer, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Self::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start a stepped scan. The pixels are copied into WASM memory and the
    /// engine's tables are reset.
    ///
    /// # Returns
    /// The number of slices the scan will take.
    ///
    /// # Errors
    /// Returns an error if the pixel data length doesn't match width * height * 4.
    pub fn begin(&mut self, pixels: Vec<u8>, width: u32, height: u32) -> Result<usize, JsValue> {
        self.begin_scan(pixels, width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Process one slice and return the fraction completed, or `undefined`
    /// once the scan is complete (or none was started).
    pub fn step(&mut self) -> Option<f64> {
        let pending = self.pending.as_mut()?;
        self.engine
            .scan_slice(&pending.pixels, &mut pending.cursor)
            .ok()
            .flatten()
            .map(|progress| progress.fraction)
    }

    /// Whether a stepped scan is in progress.
    #[wasm_bindgen(getter)]
    pub fn is_scanning(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.cursor.is_done())
    }

    /// Fraction of the current or last stepped scan completed.
    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.pending.as_ref().map_or(1.0, |p| p.cursor.fraction())
    }

    /// Stage note for progress displays.
    #[wasm_bindgen(getter)]
    pub fn note(&self) -> String {
        SCAN_NOTE.to_string()
    }

    /// Complete a stepped scan and release the copied pixels.
    pub fn finish(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            while let Ok(Some(_)) = self.engine.scan_slice(&pending.pixels, &mut pending.cursor) {}
            log::debug!("analyzer: released {} byte buffer", pending.pixels.len());
        }
    }

    /// Scan a whole image in one call.
    ///
    /// # Arguments
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `on_progress` - Optional `(fraction, note) => void` called after each slice
    ///
    /// # Errors
    /// Returns an error if the pixel data length doesn't match width * height * 4,
    /// or rethrows an exception raised by the callback.
    pub fn scan(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        on_progress: Option<js_sys::Function>,
    ) -> Result<(), JsValue> {
        self.pending = None;
        let mut session = self
            .engine
            .begin_scan(pixels, width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        while let Some(progress) = session.step() {
            if let Some(callback) = &on_progress {
                callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_f64(progress.fraction),
                    &JsValue::from_str(progress.note),
                )?;
            }
        }
        session.finish();
        Ok(())
    }

    /// Pixel count of the last scan.
    #[wasm_bindgen(getter)]
    pub fn total_pixels(&self) -> u32 {
        self.engine.total_pixels()
    }

    /// Histograms of the last scan.
    pub fn histogram(&self) -> JsHistogram {
        JsHistogram::from(self.engine.histogram())
    }

    /// Dominant colors of the last scan, most common first (at most 6 by default).
    pub fn palette(&self) -> Vec<JsPaletteEntry> {
        self.engine
            .palette()
            .into_iter()
            .map(|inner| JsPaletteEntry { inner })
            .collect()
    }

    /// Tone statistics of the last scan for the given thresholds.
    pub fn summarize(&self, thresholds: &JsThresholds) -> JsToneSummary {
        self.engine.summarize(thresholds.inner()).into()
    }
}

impl JsAnalyzer {
    pub(crate) fn with_config(config: EngineConfig) -> tonelens_core::Result<Self> {
        Ok(Self {
            engine: AnalysisEngine::new(config)?,
            pending: None,
        })
    }

    fn begin_scan(&mut self, pixels: Vec<u8>, width: u32, height: u32) -> tonelens_core::Result<usize> {
        self.pending = None;
        let cursor = self.engine.prepare(&pixels, width, height)?;
        let slices = cursor.slices_total();
        self.pending = Some(PendingScan { pixels, cursor });
        Ok(slices)
    }
}
