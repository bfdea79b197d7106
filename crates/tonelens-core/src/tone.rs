//! Tone-zone statistics and key classification.
//!
//! Everything here works on a finished luminance histogram and is O(256), so
//! it can be re-run on every threshold change without touching pixel data.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::histogram::BIN_COUNT;

/// Highlight (or shadow) share above which an image leans high (or low) key.
pub const KEY_PROPORTION: f64 = 0.35;

/// Mean luminance an image must exceed to be called high-key.
pub const HIGH_KEY_MEAN: f64 = 150.0;

/// Mean luminance an image must stay under to be called low-key.
pub const LOW_KEY_MEAN: f64 = 105.0;

/// Default shadow threshold.
pub const DEFAULT_SHADOW_LEVEL: u8 = 64;

/// Default highlight threshold.
pub const DEFAULT_HIGHLIGHT_LEVEL: u8 = 192;

/// One of the three luminance ranges cut by [`ToneThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneZone {
    /// `[0, shadow]`
    Shadow,
    /// `(shadow, highlight]`
    Midtone,
    /// `(highlight, 255]`
    Highlight,
}

/// Which threshold handle a pointer interaction moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdHandle {
    Shadow,
    Highlight,
}

/// A validated `shadow < highlight` pair of luminance levels.
///
/// Every constructor and setter rejects bad input, so a value of this type can
/// always be handed to [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdPair")]
pub struct ToneThresholds {
    shadow: u8,
    highlight: u8,
}

#[derive(Deserialize)]
struct ThresholdPair {
    shadow: i32,
    highlight: i32,
}

impl TryFrom<ThresholdPair> for ToneThresholds {
    type Error = AnalysisError;

    fn try_from(pair: ThresholdPair) -> Result<Self> {
        Self::new(pair.shadow, pair.highlight)
    }
}

impl Default for ToneThresholds {
    fn default() -> Self {
        Self {
            shadow: DEFAULT_SHADOW_LEVEL,
            highlight: DEFAULT_HIGHLIGHT_LEVEL,
        }
    }
}

fn level(value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| AnalysisError::ThresholdOutOfRange { value })
}

impl ToneThresholds {
    /// Validate and build a threshold pair.
    ///
    /// # Errors
    /// [`AnalysisError::ThresholdOutOfRange`] if either level is outside 0-255,
    /// [`AnalysisError::ThresholdOrder`] unless `shadow < highlight`.
    pub fn new(shadow: i32, highlight: i32) -> Result<Self> {
        let s = level(shadow)?;
        let h = level(highlight)?;
        if s >= h {
            return Err(AnalysisError::ThresholdOrder { shadow, highlight });
        }
        Ok(Self {
            shadow: s,
            highlight: h,
        })
    }

    pub fn shadow(&self) -> u8 {
        self.shadow
    }

    pub fn highlight(&self) -> u8 {
        self.highlight
    }

    /// Replace both levels. On error the current levels are left unchanged.
    pub fn set(&mut self, shadow: i32, highlight: i32) -> Result<()> {
        match Self::new(shadow, highlight) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err(e) => {
                warn!("rejected thresholds ({}, {}): {}", shadow, highlight, e);
                Err(e)
            }
        }
    }

    /// Move the shadow level, clamped into `[0, highlight - 1]`.
    pub fn drag_shadow(&mut self, level: i32) {
        self.shadow = level.clamp(0, self.highlight as i32 - 1) as u8;
    }

    /// Move the highlight level, clamped into `[shadow + 1, 255]`.
    pub fn drag_highlight(&mut self, level: i32) {
        self.highlight = level.clamp(self.shadow as i32 + 1, 255) as u8;
    }

    /// The handle closest to `level`; the shadow handle wins ties.
    pub fn nearest_handle(&self, level: i32) -> ThresholdHandle {
        let to_shadow = (level - self.shadow as i32).abs();
        let to_highlight = (level - self.highlight as i32).abs();
        if to_shadow <= to_highlight {
            ThresholdHandle::Shadow
        } else {
            ThresholdHandle::Highlight
        }
    }

    /// Grab the nearest handle and drag it to `level`.
    pub fn drag_nearest(&mut self, level: i32) -> ThresholdHandle {
        let handle = self.nearest_handle(level);
        match handle {
            ThresholdHandle::Shadow => self.drag_shadow(level),
            ThresholdHandle::Highlight => self.drag_highlight(level),
        }
        handle
    }

    /// Zone containing a luminance level.
    pub fn zone_of(&self, level: u8) -> ToneZone {
        if level <= self.shadow {
            ToneZone::Shadow
        } else if level <= self.highlight {
            ToneZone::Midtone
        } else {
            ToneZone::Highlight
        }
    }
}

/// Overall brightness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneKey {
    #[serde(rename = "high-key")]
    HighKey,
    #[serde(rename = "low-key")]
    LowKey,
    #[serde(rename = "neutral/wide-contrast")]
    Neutral,
}

impl ToneKey {
    pub fn label(&self) -> &'static str {
        match self {
            ToneKey::HighKey => "high-key",
            ToneKey::LowKey => "low-key",
            ToneKey::Neutral => "neutral/wide-contrast",
        }
    }

    fn classify(mean: f64, shadow: f64, highlight: f64) -> Self {
        if highlight > KEY_PROPORTION && mean > HIGH_KEY_MEAN {
            ToneKey::HighKey
        } else if shadow > KEY_PROPORTION && mean < LOW_KEY_MEAN {
            ToneKey::LowKey
        } else {
            ToneKey::Neutral
        }
    }
}

impl fmt::Display for ToneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tonal statistics of a luminance histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSummary {
    /// Mean luminance (0.0 to 255.0)
    pub mean: f64,
    /// First bin at which the cumulative count reaches half the pixels
    pub median: u8,
    /// Most populated bin (lowest on ties)
    pub peak_bin: u8,
    /// Count in the peak bin
    pub peak_count: u32,
    pub shadow_count: u64,
    pub mid_count: u64,
    pub highlight_count: u64,
    pub shadow_proportion: f64,
    pub mid_proportion: f64,
    pub highlight_proportion: f64,
    pub key: ToneKey,
}

/// Summarize a luminance histogram against a threshold pair.
///
/// With `total_pixels == 0` every statistic is reported as 0 and the key is
/// neutral; callers should treat that as "no data".
pub fn summarize(
    luminance: &[u32; BIN_COUNT],
    total_pixels: u64,
    thresholds: &ToneThresholds,
) -> ToneSummary {
    let mut weighted = 0u64;
    let mut peak_bin = 0usize;
    let mut peak_count = 0u32;
    for (i, &v) in luminance.iter().enumerate() {
        weighted += i as u64 * v as u64;
        if v > peak_count {
            peak_count = v;
            peak_bin = i;
        }
    }

    let mut median = 0usize;
    if total_pixels > 0 {
        let mut cumulative = 0u64;
        for (i, &v) in luminance.iter().enumerate() {
            cumulative += v as u64;
            if cumulative * 2 >= total_pixels {
                median = i;
                break;
            }
        }
    }

    let s = thresholds.shadow as usize;
    let h = thresholds.highlight as usize;
    let zone_sum = |bins: &[u32]| bins.iter().map(|&v| v as u64).sum::<u64>();
    let shadow_count = zone_sum(&luminance[..=s]);
    let mid_count = zone_sum(&luminance[s + 1..=h]);
    let highlight_count = zone_sum(&luminance[h + 1..]);

    let ratio = |n: u64| {
        if total_pixels == 0 {
            0.0
        } else {
            n as f64 / total_pixels as f64
        }
    };
    let mean = ratio(weighted);
    let shadow_proportion = ratio(shadow_count);
    let mid_proportion = ratio(mid_count);
    let highlight_proportion = ratio(highlight_count);

    ToneSummary {
        mean,
        median: median as u8,
        peak_bin: peak_bin as u8,
        peak_count,
        shadow_count,
        mid_count,
        highlight_count,
        shadow_proportion,
        mid_proportion,
        highlight_proportion,
        key: ToneKey::classify(mean, shadow_proportion, highlight_proportion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist_from(bins: &[(usize, u32)]) -> [u32; BIN_COUNT] {
        let mut hist = [0u32; BIN_COUNT];
        for &(i, n) in bins {
            hist[i] += n;
        }
        hist
    }

    #[test]
    fn test_default_thresholds() {
        let t = ToneThresholds::default();
        assert_eq!((t.shadow(), t.highlight()), (64, 192));
    }

    #[test]
    fn test_new_rejects_inverted_and_equal() {
        assert_eq!(
            ToneThresholds::new(200, 100),
            Err(AnalysisError::ThresholdOrder {
                shadow: 200,
                highlight: 100
            })
        );
        assert!(ToneThresholds::new(100, 100).is_err());
        assert!(ToneThresholds::new(0, 1).is_ok());
        assert!(ToneThresholds::new(254, 255).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            ToneThresholds::new(-1, 100),
            Err(AnalysisError::ThresholdOutOfRange { value: -1 })
        );
        assert_eq!(
            ToneThresholds::new(10, 256),
            Err(AnalysisError::ThresholdOutOfRange { value: 256 })
        );
    }

    #[test]
    fn test_set_rejects_inverted_and_keeps_previous() {
        let mut t = ToneThresholds::new(50, 180).unwrap();
        assert!(t.set(200, 100).is_err());
        assert_eq!((t.shadow(), t.highlight()), (50, 180));

        t.set(30, 90).unwrap();
        assert_eq!((t.shadow(), t.highlight()), (30, 90));
    }

    #[test]
    fn test_drag_clamps_handles() {
        let mut t = ToneThresholds::default();
        t.drag_shadow(250);
        assert_eq!(t.shadow(), 191);
        t.drag_shadow(-20);
        assert_eq!(t.shadow(), 0);

        t.drag_highlight(-5);
        assert_eq!(t.highlight(), 1);
        t.drag_highlight(999);
        assert_eq!(t.highlight(), 255);
    }

    #[test]
    fn test_nearest_handle() {
        let mut t = ToneThresholds::new(64, 192).unwrap();
        assert_eq!(t.nearest_handle(10), ThresholdHandle::Shadow);
        assert_eq!(t.nearest_handle(128), ThresholdHandle::Shadow);
        assert_eq!(t.nearest_handle(129), ThresholdHandle::Highlight);

        assert_eq!(t.drag_nearest(200), ThresholdHandle::Highlight);
        assert_eq!((t.shadow(), t.highlight()), (64, 200));
    }

    #[test]
    fn test_zone_of() {
        let t = ToneThresholds::new(64, 192).unwrap();
        assert_eq!(t.zone_of(0), ToneZone::Shadow);
        assert_eq!(t.zone_of(64), ToneZone::Shadow);
        assert_eq!(t.zone_of(65), ToneZone::Midtone);
        assert_eq!(t.zone_of(192), ToneZone::Midtone);
        assert_eq!(t.zone_of(193), ToneZone::Highlight);
    }

    #[test]
    fn test_two_by_two_scenario() {
        let hist = hist_from(&[(0, 1), (255, 1), (128, 2)]);
        let t = ToneThresholds::new(64, 192).unwrap();
        let s = summarize(&hist, 4, &t);

        assert!((s.mean - 127.75).abs() < 1e-12);
        assert_eq!(s.median, 128);
        assert_eq!((s.peak_bin, s.peak_count), (128, 2));
        assert_eq!((s.shadow_count, s.mid_count, s.highlight_count), (1, 2, 1));
        assert_eq!(s.shadow_proportion, 0.25);
        assert_eq!(s.mid_proportion, 0.5);
        assert_eq!(s.highlight_proportion, 0.25);
        assert_eq!(s.key, ToneKey::Neutral);
    }

    #[test]
    fn test_all_black_is_low_key() {
        let hist = hist_from(&[(0, 500)]);
        let s = summarize(&hist, 500, &ToneThresholds::new(0, 1).unwrap());

        assert_eq!(s.mean, 0.0);
        assert_eq!(s.median, 0);
        assert_eq!(s.peak_bin, 0);
        assert_eq!(s.shadow_proportion, 1.0);
        assert_eq!(s.key, ToneKey::LowKey);
    }

    #[test]
    fn test_all_white_is_high_key() {
        let hist = hist_from(&[(255, 10)]);
        let s = summarize(&hist, 10, &ToneThresholds::default());
        assert_eq!(s.highlight_proportion, 1.0);
        assert_eq!(s.median, 255);
        assert_eq!(s.key, ToneKey::HighKey);
    }

    #[test]
    fn test_high_key_needs_bright_mean() {
        // 40% highlights but a dark mean is not high-key
        let hist = hist_from(&[(0, 60), (200, 40)]);
        let s = summarize(&hist, 100, &ToneThresholds::new(10, 192).unwrap());
        assert!(s.highlight_proportion > KEY_PROPORTION);
        assert!(s.mean < HIGH_KEY_MEAN);
        // 60% shadows with mean 80 is low-key
        assert_eq!(s.key, ToneKey::LowKey);

        let s = summarize(&hist, 100, &ToneThresholds::new(0, 192).unwrap());
        assert_eq!(s.shadow_proportion, 0.6);
        assert_eq!(s.key, ToneKey::LowKey);

        let s = summarize(&hist, 100, &ToneThresholds::new(0, 250).unwrap());
        assert_eq!(s.highlight_proportion, 0.0);
        assert_eq!(s.key, ToneKey::LowKey);
    }

    #[test]
    fn test_high_key_takes_precedence() {
        // both zones above 35% and mean above 150 matches high-key first
        let hist = hist_from(&[(20, 36), (255, 64)]);
        let s = summarize(&hist, 100, &ToneThresholds::new(64, 192).unwrap());
        assert!(s.shadow_proportion > KEY_PROPORTION);
        assert!(s.mean > HIGH_KEY_MEAN);
        assert_eq!(s.key, ToneKey::HighKey);
    }

    #[test]
    fn test_empty_histogram_reports_zero() {
        let s = summarize(&[0; BIN_COUNT], 0, &ToneThresholds::default());
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.median, 0);
        assert_eq!((s.peak_bin, s.peak_count), (0, 0));
        assert_eq!(s.shadow_proportion, 0.0);
        assert_eq!(s.mid_proportion, 0.0);
        assert_eq!(s.highlight_proportion, 0.0);
        assert_eq!(s.key, ToneKey::Neutral);
    }

    #[test]
    fn test_median_odd_total() {
        // 3 pixels: half is 1.5, reached at the second pixel's bin
        let hist = hist_from(&[(10, 1), (20, 1), (30, 1)]);
        let s = summarize(&hist, 3, &ToneThresholds::default());
        assert_eq!(s.median, 20);
    }

    #[test]
    fn test_peak_prefers_lowest_bin_on_tie() {
        let hist = hist_from(&[(40, 5), (90, 5)]);
        let s = summarize(&hist, 10, &ToneThresholds::default());
        assert_eq!((s.peak_bin, s.peak_count), (40, 5));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let hist = hist_from(&[(3, 7), (77, 11), (201, 5)]);
        let t = ToneThresholds::new(50, 150).unwrap();
        assert_eq!(summarize(&hist, 23, &t), summarize(&hist, 23, &t));
    }

    #[test]
    fn test_tone_key_labels_and_serde() {
        assert_eq!(ToneKey::HighKey.to_string(), "high-key");
        assert_eq!(ToneKey::LowKey.label(), "low-key");
        assert_eq!(
            serde_json::to_string(&ToneKey::Neutral).unwrap(),
            "\"neutral/wide-contrast\""
        );
    }

    #[test]
    fn test_thresholds_deserialize_validates() {
        let t: ToneThresholds = serde_json::from_str(r#"{"shadow":30,"highlight":220}"#).unwrap();
        assert_eq!((t.shadow(), t.highlight()), (30, 220));

        assert!(serde_json::from_str::<ToneThresholds>(r#"{"shadow":220,"highlight":30}"#).is_err());
        assert!(serde_json::from_str::<ToneThresholds>(r#"{"shadow":-4,"highlight":30}"#).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
