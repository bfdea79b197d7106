//! Luminance calculation using ITU-R BT.709 coefficients.
//!
//! Histogram binning needs the floor of the weighted sum, not a rounded value,
//! so the u8 path works in fixed point with weights scaled by [`WEIGHT_SCALE`].
//! The scaled weights sum to exactly `WEIGHT_SCALE`, which keeps every result
//! inside 0-255 and maps neutral grays onto their own bin.

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f64 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f64 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f64 = 0.0722;

/// Denominator of the fixed-point weights below.
pub const WEIGHT_SCALE: u32 = 10_000;

const WEIGHT_R: u32 = 2126;
const WEIGHT_G: u32 = 7152;
const WEIGHT_B: u32 = 722;

/// Luminance bin for an 8-bit RGB triple: `floor(0.2126·r + 0.7152·g + 0.0722·b)`.
///
/// # Arguments
/// * `r` - Red channel value (0-255)
/// * `g` - Green channel value (0-255)
/// * `b` - Blue channel value (0-255)
///
/// # Returns
/// Luminance bin (0-255)
#[inline]
pub fn luminance_bin(r: u8, g: u8, b: u8) -> u8 {
    let weighted = WEIGHT_R * r as u32 + WEIGHT_G * g as u32 + WEIGHT_B * b as u32;
    // weighted <= 255 * WEIGHT_SCALE, so the quotient always fits
    (weighted / WEIGHT_SCALE) as u8
}
