//! Histogram WASM bindings.
//!
//! This module exposes the luminance and RGB histograms to JavaScript for the
//! histogram display, together with the normalization and clipping helpers
//! the display needs.

use tonelens_core::histogram::{compute_histogram as compute_histogram_core, Histogram};
use wasm_bindgen::prelude::*;

/// Histogram result accessible from JavaScript.
///
/// Contains 256-bin histograms for red, green, blue, and luminance channels,
/// plus helper values for clipping detection and normalization.
#[wasm_bindgen]
pub struct JsHistogram {
    red: Vec<u32>,
    green: Vec<u32>,
    blue: Vec<u32>,
    luminance: Vec<u32>,
    max_value: u32,
    max_luminance: u32,
    has_highlight_clipping: bool,
    has_shadow_clipping: bool,
}

#[wasm_bindgen]
impl JsHistogram {
    /// Get red channel histogram (256 bins).
    pub fn red(&self) -> Vec<u32> {
        self.red.clone()
    }

    /// Get green channel histogram (256 bins).
    pub fn green(&self) -> Vec<u32> {
        self.green.clone()
    }

    /// Get blue channel histogram (256 bins).
    pub fn blue(&self) -> Vec<u32> {
        self.blue.clone()
    }

    /// Get luminance histogram (256 bins).
    pub fn luminance(&self) -> Vec<u32> {
        self.luminance.clone()
    }

    /// Maximum bin value across all RGB channels, for the RGB display mode.
    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Maximum luminance bin, for the luminance display mode.
    #[wasm_bindgen(getter)]
    pub fn max_luminance(&self) -> u32 {
        self.max_luminance
    }

    /// Check if any RGB channel has values at 255 (highlight clipping).
    #[wasm_bindgen(getter)]
    pub fn has_highlight_clipping(&self) -> bool {
        self.has_highlight_clipping
    }

    /// Check if any RGB channel has values at 0 (shadow clipping).
    #[wasm_bindgen(getter)]
    pub fn has_shadow_clipping(&self) -> bool {
        self.has_shadow_clipping
    }
}

impl From<&Histogram> for JsHistogram {
    fn from(hist: &Histogram) -> Self {
        JsHistogram {
            red: hist.red.to_vec(),
            green: hist.green.to_vec(),
            blue: hist.blue.to_vec(),
            luminance: hist.luminance.to_vec(),
            max_value: hist.max_value(),
            max_luminance: hist.max_luminance(),
            has_highlight_clipping: hist.has_highlight_clipping(),
            has_shadow_clipping: hist.has_shadow_clipping(),
        }
    }
}

/// Compute histograms from RGBA pixel data in a single call.
///
/// For large images prefer `JsAnalyzer`, which scans in slices and also
/// extracts the palette.
///
/// # Arguments
/// * `pixels` - RGBA pixel data as Uint8Array (4 bytes per pixel, row-major)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
/// Returns an error if the pixel data length doesn't match width * height * 4.
///
/// # Example (TypeScript)
/// ```typescript
/// const { data } = ctx.getImageData(0, 0, w, h);
/// const hist = compute_histogram(data, w, h);
/// const lumBins = hist.luminance();   // Uint32Array[256]
/// const clipped = hist.has_highlight_clipping;
/// hist.free();
/// ```
#[wasm_bindgen]
pub fn compute_histogram(pixels: &[u8], width: u32, height: u32) -> Result<JsHistogram, JsValue> {
    compute_histogram_core(pixels, width, height)
        .map(|hist| JsHistogram::from(&hist))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}


/// WASM-specific tests that require JsValue.
///
/// These tests use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_compute_histogram_ok() {
        let pixels = vec![255u8; 2 * 2 * 4];
        let hist = compute_histogram(&pixels, 2, 2).unwrap();
        assert_eq!(hist.luminance()[255], 4);
    }

    #[wasm_bindgen_test]
    fn test_compute_histogram_rejects_rgb() {
        let pixels = vec![255u8; 2 * 2 * 3];
        assert!(compute_histogram(&pixels, 2, 2).is_err());
    }
}
