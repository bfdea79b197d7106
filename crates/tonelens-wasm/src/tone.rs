//! Threshold and tone summary WASM bindings.
//!
//! The summary is recomputed from the luminance histogram on every threshold
//! change, so the threshold handles can be dragged without re-scanning.

use tonelens_core::histogram::BIN_COUNT;
use tonelens_core::tone::{summarize, ThresholdHandle, ToneSummary, ToneThresholds, ToneZone};
use wasm_bindgen::prelude::*;

/// Shadow/highlight threshold pair with `shadow < highlight` always held.
///
/// # Example (TypeScript)
/// ```typescript
/// const t = new JsThresholds(64, 192);
/// try { t.set(200, 100); } catch (e) { /* rejected, t unchanged */ }
/// t.drag_nearest(levelUnderPointer);
/// ```
#[wasm_bindgen]
pub struct JsThresholds {
    inner: ToneThresholds,
}

#[wasm_bindgen]
impl JsThresholds {
    /// Create a validated threshold pair.
    ///
    /// # Errors
    /// Returns an error unless `0 <= shadow < highlight <= 255`.
    #[wasm_bindgen(constructor)]
    pub fn new(shadow: i32, highlight: i32) -> Result<JsThresholds, JsValue> {
        ToneThresholds::new(shadow, highlight)
            .map(|inner| JsThresholds { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The default pair (64, 192).
    pub fn defaults() -> JsThresholds {
        JsThresholds {
            inner: ToneThresholds::default(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn shadow(&self) -> u8 {
        self.inner.shadow()
    }

    #[wasm_bindgen(getter)]
    pub fn highlight(&self) -> u8 {
        self.inner.highlight()
    }

    /// Replace both levels. On error the previous levels are kept.
    pub fn set(&mut self, shadow: i32, highlight: i32) -> Result<(), JsValue> {
        self.inner
            .set(shadow, highlight)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Move the shadow handle, clamped below the highlight handle.
    pub fn drag_shadow(&mut self, level: i32) {
        self.inner.drag_shadow(level);
    }

    /// Move the highlight handle, clamped above the shadow handle.
    pub fn drag_highlight(&mut self, level: i32) {
        self.inner.drag_highlight(level);
    }

    /// Move whichever handle is closer to `level`.
    ///
    /// Returns `"shadow"` or `"highlight"`.
    pub fn drag_nearest(&mut self, level: i32) -> String {
        handle_name(self.inner.drag_nearest(level)).to_string()
    }

    /// Zone of a luminance level: `"shadow"`, `"midtone"` or `"highlight"`.
    pub fn zone_of(&self, level: u8) -> String {
        zone_name(self.inner.zone_of(level)).to_string()
    }
}

impl JsThresholds {
    pub(crate) fn inner(&self) -> &ToneThresholds {
        &self.inner
    }
}

fn handle_name(handle: ThresholdHandle) -> &'static str {
    match handle {
        ThresholdHandle::Shadow => "shadow",
        ThresholdHandle::Highlight => "highlight",
    }
}

fn zone_name(zone: ToneZone) -> &'static str {
    match zone {
        ToneZone::Shadow => "shadow",
        ToneZone::Midtone => "midtone",
        ToneZone::Highlight => "highlight",
    }
}

/// Tone statistics for display.
#[wasm_bindgen]
pub struct JsToneSummary {
    inner: ToneSummary,
}

#[wasm_bindgen]
impl JsToneSummary {
    /// Mean luminance (0-255).
    #[wasm_bindgen(getter)]
    pub fn mean(&self) -> f64 {
        self.inner.mean
    }

    #[wasm_bindgen(getter)]
    pub fn median(&self) -> u8 {
        self.inner.median
    }

    #[wasm_bindgen(getter)]
    pub fn peak_bin(&self) -> u8 {
        self.inner.peak_bin
    }

    #[wasm_bindgen(getter)]
    pub fn peak_count(&self) -> u32 {
        self.inner.peak_count
    }

    #[wasm_bindgen(getter)]
    pub fn shadow_proportion(&self) -> f64 {
        self.inner.shadow_proportion
    }

    #[wasm_bindgen(getter)]
    pub fn mid_proportion(&self) -> f64 {
        self.inner.mid_proportion
    }

    #[wasm_bindgen(getter)]
    pub fn highlight_proportion(&self) -> f64 {
        self.inner.highlight_proportion
    }

    /// `"high-key"`, `"low-key"` or `"neutral/wide-contrast"`.
    #[wasm_bindgen(getter)]
    pub fn key(&self) -> String {
        self.inner.key.label().to_string()
    }

    /// The full summary as a plain JS object.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl From<ToneSummary> for JsToneSummary {
    fn from(inner: ToneSummary) -> Self {
        Self { inner }
    }
}

/// Summarize a luminance histogram held on the JS side.
///
/// # Errors
/// Returns an error if `luminance` does not have exactly 256 bins.
#[wasm_bindgen]
pub fn summarize_luminance(
    luminance: &[u32],
    total_pixels: u32,
    thresholds: &JsThresholds,
) -> Result<JsToneSummary, JsValue> {
    let bins: &[u32; BIN_COUNT] = luminance.try_into().map_err(|_| {
        JsValue::from_str(&format!(
            "Luminance histogram must have {} bins, got {}",
            BIN_COUNT,
            luminance.len()
        ))
    })?;
    Ok(summarize(bins, total_pixels as u64, thresholds.inner()).into())
}
