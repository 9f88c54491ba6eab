//! Colour conversions and linear blending for chart gradients
//!
//! Gauge and gradient components hand over two endpoint colours and a fill
//! fraction; everything here is pure and allocation-light.
//!
//! Conventions:
//! - Hex output is always lowercase `#rrggbb`.
//! - Hex input accepts `#rrggbb`, `rrggbb` and the `#rgb` shorthand, any case.
//! - Interpolation factors are clamped to `0.0..=1.0` (NaN counts as 0).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ColorError;

/// RGB triple. `u8` channels keep every value inside `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from unconstrained integer channels, clamping each to `0..=255`.
    pub fn from_channels(r: i64, g: i64, b: i64) -> Self {
        let c = |v: i64| v.clamp(0, 255) as u8;
        Self::new(c(r), c(g), c(b))
    }

    /// Build from float channels: rounded, clamped, NaN -> 0.
    pub fn from_f64_channels(r: f64, g: f64, b: f64) -> Self {
        Self::new(channel_from_f64(r), channel_from_f64(g), channel_from_f64(b))
    }

    pub fn to_hex(self) -> HexColor {
        rgb_to_hex(self)
    }

    /// CSS functional notation, e.g. `rgb(255, 128, 0)`.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl std::str::FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

/// Validated `#rrggbb` string (lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse any accepted hex spelling and normalise it.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        hex_to_rgb(s).map(rgb_to_hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rgb(&self) -> Rgb {
        // Invariant: the inner string was produced by `rgb_to_hex`.
        hex_to_rgb(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Rgb> for HexColor {
    fn from(rgb: Rgb) -> Self {
        rgb_to_hex(rgb)
    }
}

impl From<HexColor> for String {
    fn from(hex: HexColor) -> Self {
        hex.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

fn channel_from_f64(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse a hex colour into an RGB triple.
///
/// The leading `#` is optional and surrounding whitespace is ignored.
/// Accepted forms:
/// * `#RRGGBB`
/// * `#RGB` (each digit doubled)
///
/// Malformed input is an error; the same input always yields the same error.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ColorError::Empty);
    }

    let invalid = || ColorError::InvalidHex(hex.to_string());
    let bytes = digits.as_bytes();
    match bytes.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, &c) in out.iter_mut().zip(bytes) {
                *slot = nibble(c).ok_or_else(invalid)? * 17;
            }
            Ok(Rgb::from(out))
        }
        6 => {
            let mut out = [0u8; 3];
            for (slot, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
                let hi = nibble(pair[0]).ok_or_else(invalid)?;
                let lo = nibble(pair[1]).ok_or_else(invalid)?;
                *slot = hi << 4 | lo;
            }
            Ok(Rgb::from(out))
        }
        // Non-ASCII junk is bad digits, not a length mismatch.
        _ if !digits.is_ascii() => Err(invalid()),
        n => Err(ColorError::InvalidLength(n)),
    }
}

/// Same as [`hex_to_rgb`] but degrades to `fallback` on malformed input.
pub fn hex_to_rgb_or(hex: &str, fallback: Rgb) -> Rgb {
    hex_to_rgb(hex).unwrap_or_else(|e| {
        log::debug!("[color] {e}; using fallback {}", rgb_to_hex(fallback));
        fallback
    })
}

/// Format an RGB triple as lowercase `#rrggbb`.
pub fn rgb_to_hex(rgb: Rgb) -> HexColor {
    HexColor(format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b))
}

/// Format unconstrained channels, clamping each to `0..=255` first.
pub fn channels_to_hex(r: i64, g: i64, b: i64) -> HexColor {
    rgb_to_hex(Rgb::from_channels(r, g, b))
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let (a, b) = (a as f64, b as f64);
    channel_from_f64(a + (b - a) * t)
}

fn clamp_factor(factor: f64) -> f64 {
    if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    }
}

/// Per-channel linear blend, rounded half away from zero.
pub fn lerp_rgb(c1: Rgb, c2: Rgb, factor: f64) -> Rgb {
    let t = clamp_factor(factor);
    Rgb::new(
        lerp_channel(c1.r, c2.r, t),
        lerp_channel(c1.g, c2.g, t),
        lerp_channel(c1.b, c2.b, t),
    )
}

/// Blend two colours and return the CSS `rgb(R, G, B)` form.
///
/// `factor` 0 yields `c1` exactly, 1 yields `c2`; values outside the unit
/// range are clamped.
pub fn interpolate_color(c1: Rgb, c2: Rgb, factor: f64) -> String {
    lerp_rgb(c1, c2, factor).to_css()
}

/// Largest ramp [`gradient`] will build.
pub const MAX_GRADIENT_STEPS: usize = 256;

/// Evenly spaced ramp from `from` to `to` inclusive.
///
/// `steps` is capped at [`MAX_GRADIENT_STEPS`].
pub fn gradient(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    match steps.min(MAX_GRADIENT_STEPS) {
        0 => Vec::new(),
        1 => vec![from],
        steps => {
            let divisor = (steps - 1) as f64;
            (0..steps)
                .map(|i| lerp_rgb(from, to, i as f64 / divisor))
                .collect()
        }
    }
}

/// Relative luminance (WCAG 2.x).
pub fn relative_luminance(c: Rgb) -> f64 {
    let to_l = |x: u8| {
        let xf = x as f64 / 255.0;
        if xf <= 0.03928 {
            xf / 12.92
        } else {
            ((xf + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * to_l(c.r) + 0.7152 * to_l(c.g) + 0.0722 * to_l(c.b)
}

/// Contrast ratio between two colours, always `>= 1.0`.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    let (hi, lo) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (hi + 0.05) / (lo + 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing_forms() {
        let orange = Rgb::new(255, 136, 0);
        assert_eq!(hex_to_rgb("#ff8800").unwrap(), orange);
        assert_eq!(hex_to_rgb("FF8800").unwrap(), orange);
        assert_eq!(hex_to_rgb("  #Ff8800 ").unwrap(), orange);
        assert_eq!(hex_to_rgb("#f80").unwrap(), orange);
    }

    #[test]
    fn test_hex_parsing_errors() {
        assert_eq!(hex_to_rgb(""), Err(ColorError::Empty));
        assert_eq!(hex_to_rgb("#"), Err(ColorError::Empty));
        assert_eq!(hex_to_rgb("#12345"), Err(ColorError::InvalidLength(5)));
        assert_eq!(hex_to_rgb("#1234567"), Err(ColorError::InvalidLength(7)));
        assert_eq!(
            hex_to_rgb("#ZZZZZZ"),
            Err(ColorError::InvalidHex("#ZZZZZZ".into()))
        );
        assert!(matches!(hex_to_rgb("#ééé"), Err(ColorError::InvalidHex(_))));
    }

    #[test]
    fn test_hex_to_rgb_or_fallback() {
        assert_eq!(hex_to_rgb_or("nope", Rgb::WHITE), Rgb::WHITE);
        assert_eq!(hex_to_rgb_or("#000", Rgb::WHITE), Rgb::BLACK);
    }

    #[test]
    fn test_rgb_to_hex_lowercase_padded() {
        assert_eq!(rgb_to_hex(Rgb::new(0, 10, 255)).as_str(), "#000aff");
        assert_eq!(Rgb::new(171, 205, 239).to_hex().to_string(), "#abcdef");
    }

    #[test]
    fn test_channels_clamped_before_formatting() {
        assert_eq!(channels_to_hex(300, -5, 128).as_str(), "#ff0080");
        assert_eq!(
            Rgb::from_f64_channels(f64::NAN, 254.6, -3.0),
            Rgb::new(0, 255, 0)
        );
    }

    #[test]
    fn test_interpolate_endpoints_and_midpoint() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(interpolate_color(a, b, 0.0), "rgb(10, 20, 30)");
        assert_eq!(interpolate_color(a, b, 1.0), "rgb(200, 100, 0)");
        assert_eq!(
            interpolate_color(Rgb::BLACK, Rgb::WHITE, 0.5),
            "rgb(128, 128, 128)"
        );
    }

    #[test]
    fn test_interpolate_factor_is_clamped() {
        let a = Rgb::new(100, 100, 100);
        let b = Rgb::new(200, 0, 50);
        assert_eq!(lerp_rgb(a, b, -1.0), a);
        assert_eq!(lerp_rgb(a, b, 2.5), b);
        assert_eq!(lerp_rgb(a, b, f64::NAN), a);
    }

    #[test]
    fn test_gradient_steps() {
        assert!(gradient(Rgb::BLACK, Rgb::WHITE, 0).is_empty());
        assert_eq!(gradient(Rgb::BLACK, Rgb::WHITE, 1), vec![Rgb::BLACK]);

        let ramp = gradient(Rgb::BLACK, Rgb::WHITE, 3);
        assert_eq!(ramp, vec![Rgb::BLACK, Rgb::new(128, 128, 128), Rgb::WHITE]);
    }

    #[test]
    fn test_gradient_step_cap() {
        let ramp = gradient(Rgb::BLACK, Rgb::WHITE, usize::MAX);
        assert_eq!(ramp.len(), MAX_GRADIENT_STEPS);
        assert_eq!(ramp.first(), Some(&Rgb::BLACK));
        assert_eq!(ramp.last(), Some(&Rgb::WHITE));
    }

    #[test]
    fn test_contrast_ratio_extremes() {
        let ratio = contrast_ratio(Rgb::BLACK, Rgb::WHITE);
        assert!((ratio - 21.0).abs() < 0.01);
        assert!((contrast_ratio(Rgb::WHITE, Rgb::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_color_serde_normalises() {
        let hex: HexColor = serde_json::from_str("\"#ABC\"").unwrap();
        assert_eq!(hex.as_str(), "#aabbcc");
        assert_eq!(hex.to_rgb(), Rgb::new(0xaa, 0xbb, 0xcc));
        assert!(serde_json::from_str::<HexColor>("\"#xyz\"").is_err());
    }
}
