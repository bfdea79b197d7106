//! Tonelens WASM - WebAssembly bindings for Tonelens
//!
//! This crate exposes the tonelens-core analysis engine to JavaScript/TypeScript
//! applications. Decoding, downscaling and drawing stay on the JS side; the
//! bindings take canvas `ImageData` pixels and return histograms, a dominant
//! color palette and tone statistics.
//!
//! # Module Structure
//!
//! - `analyzer` - `JsAnalyzer`, the stepped or one-shot scan of an image
//! - `histogram` - histogram result type and a one-shot histogram function
//! - `tone` - threshold handles and tone summary
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsAnalyzer, JsThresholds } from '@tonelens/wasm';
//!
//! await init();
//!
//! const analyzer = new JsAnalyzer();
//! analyzer.scan(imageData.data, w, h, (f, note) => console.log(note, f));
//! const summary = analyzer.summarize(new JsThresholds(64, 192));
//! console.log(summary.key, summary.mean);
//! ```

use wasm_bindgen::prelude::*;

mod analyzer;
mod histogram;
mod tone;

// Re-export public types
pub use analyzer::{JsAnalyzer, JsPaletteEntry};
pub use histogram::{compute_histogram, JsHistogram};
pub use tone::{summarize_luminance, JsThresholds, JsToneSummary};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. module re-instantiated) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Change the log level at runtime: `"error"`, `"warn"`, `"info"`, `"debug"`
/// or `"trace"`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    log::set_max_level(filter);
    Ok(())
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse::<log::LevelFilter>().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
